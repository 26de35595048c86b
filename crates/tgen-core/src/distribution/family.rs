//! Параметрические семейства непрерывных распределений
//!
//! Каждое семейство описано в стандартизованной форме: плотность и функция
//! распределения от z = (x - loc) / scale при заданных параметрах формы.
//! Кортеж параметров всегда упорядочен как `[формы..., loc, scale]`.

use std::f64::consts::PI;

use rand::distributions::Open01;
use rand::Rng;
use rand_distr::{
    Beta, Distribution, FisherF, Gamma, LogNormal, Pareto, StandardNormal, StudentT, Weibull,
};
use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;

use super::special::{
    ln_norm_pdf, norm_cdf, norm_ppf, reg_beta, reg_gamma_lower, safe_ln_beta, LN_SQRT_2PI,
};

/// Семейство распределений из каталога
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Family {
    /// Альфа-распределение (форма `a`)
    Alpha,
    /// Арксинус
    Arcsine,
    /// Бета (формы `a`, `b`)
    Beta,
    /// Коши
    Cauchy,
    /// Косинусное
    Cosine,
    /// Экспоненциальное
    Exponential,
    /// F-распределение Фишера (формы `dfn`, `dfd`)
    FisherF,
    /// Гамма (форма `a`)
    Gamma,
    /// Лаплас
    Laplace,
    /// Логистическое
    Logistic,
    /// Лог-Лаплас (форма `c`)
    LogLaplace,
    /// Логнормальное (форма `s`)
    LogNormal,
    /// Нормальное
    Normal,
    /// Парето (форма `b`)
    Pareto,
    /// Степенное на [0, 1] (форма `a`)
    PowerLaw,
    /// Power-normal (форма `c`)
    PowerNormal,
    /// R-распределение (форма `c`)
    RDist,
    /// Обратное (reciprocal, формы `a`, `b`)
    Reciprocal,
    /// Полукруговое (Вигнера)
    Semicircular,
    /// t-распределение Стьюдента (форма `df`)
    StudentT,
    /// Треугольное (форма `c`)
    Triangular,
    /// Равномерное
    Uniform,
    /// Вейбулл (минимум, форма `c`)
    WeibullMin,
    /// Вейбулл (максимум, форма `c`)
    WeibullMax,
}

/// Стандартизованный носитель `[low, high]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support {
    /// Нижняя граница (может быть -inf)
    pub low: f64,
    /// Верхняя граница (может быть +inf)
    pub high: f64,
}

impl Support {
    const REAL: Support = Support {
        low: f64::NEG_INFINITY,
        high: f64::INFINITY,
    };

    const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Ограничен ли носитель снизу
    pub fn bounded_below(&self) -> bool {
        self.low.is_finite()
    }

    /// Ограничен ли носитель сверху
    pub fn bounded_above(&self) -> bool {
        self.high.is_finite()
    }
}

impl Family {
    /// Все семейства в порядке каталога
    pub const ALL: [Family; 24] = [
        Family::Alpha,
        Family::Arcsine,
        Family::Beta,
        Family::Cauchy,
        Family::Cosine,
        Family::Exponential,
        Family::FisherF,
        Family::Gamma,
        Family::Laplace,
        Family::Logistic,
        Family::LogLaplace,
        Family::LogNormal,
        Family::Normal,
        Family::Pareto,
        Family::PowerLaw,
        Family::PowerNormal,
        Family::RDist,
        Family::Reciprocal,
        Family::Semicircular,
        Family::StudentT,
        Family::Triangular,
        Family::Uniform,
        Family::WeibullMin,
        Family::WeibullMax,
    ];

    /// Каноническое имя семейства в каталоге
    pub fn name(self) -> &'static str {
        match self {
            Family::Alpha => "alpha",
            Family::Arcsine => "arcsine",
            Family::Beta => "beta",
            Family::Cauchy => "cauchy",
            Family::Cosine => "cosine",
            Family::Exponential => "expon",
            Family::FisherF => "f",
            Family::Gamma => "gamma",
            Family::Laplace => "laplace",
            Family::Logistic => "logistic",
            Family::LogLaplace => "loglaplace",
            Family::LogNormal => "lognorm",
            Family::Normal => "norm",
            Family::Pareto => "pareto",
            Family::PowerLaw => "powerlaw",
            Family::PowerNormal => "powernorm",
            Family::RDist => "rdist",
            Family::Reciprocal => "reciprocal",
            Family::Semicircular => "semicircular",
            Family::StudentT => "t",
            Family::Triangular => "triang",
            Family::Uniform => "uniform",
            Family::WeibullMin => "weibull_min",
            Family::WeibullMax => "weibull_max",
        }
    }

    /// Поиск семейства по имени каталога
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Имена параметров формы
    pub fn shape_names(self) -> &'static [&'static str] {
        match self {
            Family::Alpha | Family::Gamma | Family::PowerLaw => &["a"],
            Family::Beta | Family::Reciprocal => &["a", "b"],
            Family::FisherF => &["dfn", "dfd"],
            Family::LogLaplace
            | Family::PowerNormal
            | Family::RDist
            | Family::Triangular
            | Family::WeibullMin
            | Family::WeibullMax => &["c"],
            Family::LogNormal => &["s"],
            Family::Pareto => &["b"],
            Family::StudentT => &["df"],
            Family::Arcsine
            | Family::Cauchy
            | Family::Cosine
            | Family::Exponential
            | Family::Laplace
            | Family::Logistic
            | Family::Normal
            | Family::Semicircular
            | Family::Uniform => &[],
        }
    }

    /// Количество параметров формы
    pub fn shape_count(self) -> usize {
        self.shape_names().len()
    }

    /// Полное количество параметров (формы + loc + scale)
    pub fn param_count(self) -> usize {
        self.shape_count() + 2
    }

    /// Стандартизованный носитель при заданных формах
    pub fn support(self, shapes: &[f64]) -> Support {
        match self {
            Family::Alpha
            | Family::FisherF
            | Family::Gamma
            | Family::LogLaplace
            | Family::LogNormal => Support::new(0.0, f64::INFINITY),
            Family::Exponential | Family::WeibullMin => Support::new(0.0, f64::INFINITY),
            Family::WeibullMax => Support::new(f64::NEG_INFINITY, 0.0),
            Family::Pareto => Support::new(1.0, f64::INFINITY),
            Family::Arcsine
            | Family::Beta
            | Family::PowerLaw
            | Family::Triangular
            | Family::Uniform => Support::new(0.0, 1.0),
            Family::RDist | Family::Semicircular => Support::new(-1.0, 1.0),
            Family::Cosine => Support::new(-PI, PI),
            Family::Reciprocal => match shapes {
                [a, b, ..] => Support::new(*a, *b),
                _ => Support::new(f64::NAN, f64::NAN),
            },
            Family::Cauchy
            | Family::Laplace
            | Family::Logistic
            | Family::Normal
            | Family::PowerNormal
            | Family::StudentT => Support::REAL,
        }
    }

    /// Допустимы ли параметры формы
    pub fn shapes_valid(self, shapes: &[f64]) -> bool {
        if shapes.len() != self.shape_count() || shapes.iter().any(|s| !s.is_finite()) {
            return false;
        }
        match self {
            Family::Reciprocal => shapes[0] > 0.0 && shapes[1] > shapes[0],
            Family::Triangular => (0.0..=1.0).contains(&shapes[0]),
            _ => shapes.iter().all(|&s| s > 0.0),
        }
    }

    /// Логарифм стандартизованной плотности; -inf вне носителя
    pub(crate) fn ln_pdf_std(self, z: f64, s: &[f64]) -> f64 {
        let support = self.support(s);
        if !(z >= support.low && z <= support.high) {
            return f64::NEG_INFINITY;
        }
        match self {
            Family::Alpha => {
                let a = s[0];
                let t = a - 1.0 / z;
                -2.0 * z.ln() - norm_cdf(a).ln() - LN_SQRT_2PI - 0.5 * t * t
            }
            Family::Arcsine => -PI.ln() - 0.5 * z.ln() - 0.5 * (1.0 - z).ln(),
            Family::Beta => {
                let (a, b) = (s[0], s[1]);
                (a - 1.0) * z.ln() + (b - 1.0) * (1.0 - z).ln() - safe_ln_beta(a, b)
            }
            Family::Cauchy => -PI.ln() - (1.0 + z * z).ln(),
            Family::Cosine => (1.0 + z.cos()).ln() - (2.0 * PI).ln(),
            Family::Exponential => -z,
            Family::FisherF => {
                let (d1, d2) = (s[0], s[1]);
                0.5 * d1 * (d1 / d2).ln() + (0.5 * d1 - 1.0) * z.ln()
                    - 0.5 * (d1 + d2) * (1.0 + d1 * z / d2).ln()
                    - safe_ln_beta(0.5 * d1, 0.5 * d2)
            }
            Family::Gamma => {
                let a = s[0];
                (a - 1.0) * z.ln() - z - ln_gamma(a)
            }
            Family::Laplace => -std::f64::consts::LN_2 - z.abs(),
            Family::Logistic => {
                let az = z.abs();
                -az - 2.0 * (-az).exp().ln_1p()
            }
            Family::LogLaplace => {
                let c = s[0];
                let base = (0.5 * c).ln();
                if z < 1.0 {
                    base + (c - 1.0) * z.ln()
                } else {
                    base - (c + 1.0) * z.ln()
                }
            }
            Family::LogNormal => {
                let sigma = s[0];
                let lz = z.ln();
                -lz - sigma.ln() - LN_SQRT_2PI - lz * lz / (2.0 * sigma * sigma)
            }
            Family::Normal => ln_norm_pdf(z),
            Family::Pareto => {
                let b = s[0];
                b.ln() - (b + 1.0) * z.ln()
            }
            Family::PowerLaw => {
                let a = s[0];
                a.ln() + (a - 1.0) * z.ln()
            }
            Family::PowerNormal => {
                let c = s[0];
                c.ln() + ln_norm_pdf(z) + (c - 1.0) * norm_cdf(-z).ln()
            }
            Family::RDist => {
                let c = s[0];
                (0.5 * c - 1.0) * (1.0 - z * z).ln() - safe_ln_beta(0.5, 0.5 * c)
            }
            Family::Reciprocal => {
                let (a, b) = (s[0], s[1]);
                -z.ln() - (b / a).ln().ln()
            }
            Family::Semicircular => (2.0 / PI).ln() + 0.5 * (1.0 - z * z).ln(),
            Family::StudentT => {
                let df = s[0];
                ln_gamma(0.5 * (df + 1.0))
                    - ln_gamma(0.5 * df)
                    - 0.5 * (df * PI).ln()
                    - 0.5 * (df + 1.0) * (z * z / df).ln_1p()
            }
            Family::Triangular => {
                let c = s[0];
                if z < c {
                    (2.0 * z / c).ln()
                } else if z > c || c < 1.0 {
                    (2.0 * (1.0 - z) / (1.0 - c)).ln()
                } else {
                    std::f64::consts::LN_2
                }
            }
            Family::Uniform => 0.0,
            Family::WeibullMin => {
                let c = s[0];
                c.ln() + (c - 1.0) * z.ln() - z.powf(c)
            }
            Family::WeibullMax => {
                let c = s[0];
                let w = -z;
                c.ln() + (c - 1.0) * w.ln() - w.powf(c)
            }
        }
    }

    /// Стандартизованная функция распределения
    pub(crate) fn cdf_std(self, z: f64, s: &[f64]) -> f64 {
        let support = self.support(s);
        if z <= support.low {
            return 0.0;
        }
        if z >= support.high {
            return 1.0;
        }
        match self {
            Family::Alpha => norm_cdf(s[0] - 1.0 / z) / norm_cdf(s[0]),
            Family::Arcsine => 2.0 / PI * z.sqrt().asin(),
            Family::Beta => reg_beta(s[0], s[1], z),
            Family::Cauchy => 0.5 + z.atan() / PI,
            Family::Cosine => (PI + z + z.sin()) / (2.0 * PI),
            Family::Exponential => -(-z).exp_m1(),
            Family::FisherF => {
                let (d1, d2) = (s[0], s[1]);
                reg_beta(0.5 * d1, 0.5 * d2, d1 * z / (d1 * z + d2))
            }
            Family::Gamma => reg_gamma_lower(s[0], z),
            Family::Laplace => {
                if z < 0.0 {
                    0.5 * z.exp()
                } else {
                    1.0 - 0.5 * (-z).exp()
                }
            }
            Family::Logistic => 1.0 / (1.0 + (-z).exp()),
            Family::LogLaplace => {
                let c = s[0];
                if z < 1.0 {
                    0.5 * z.powf(c)
                } else {
                    1.0 - 0.5 * z.powf(-c)
                }
            }
            Family::LogNormal => norm_cdf(z.ln() / s[0]),
            Family::Normal => norm_cdf(z),
            Family::Pareto => 1.0 - z.powf(-s[0]),
            Family::PowerLaw => z.powf(s[0]),
            Family::PowerNormal => 1.0 - norm_cdf(-z).powf(s[0]),
            Family::RDist => {
                let half = 0.5 * s[0];
                reg_beta(half, half, 0.5 * (z + 1.0))
            }
            Family::Reciprocal => (z / s[0]).ln() / (s[1] / s[0]).ln(),
            Family::Semicircular => 0.5 + (z * (1.0 - z * z).sqrt() + z.asin()) / PI,
            Family::StudentT => {
                let df = s[0];
                let tail = 0.5 * reg_beta(0.5 * df, 0.5, df / (df + z * z));
                if z < 0.0 {
                    tail
                } else {
                    1.0 - tail
                }
            }
            Family::Triangular => {
                let c = s[0];
                if z < c {
                    z * z / c
                } else {
                    1.0 - (1.0 - z) * (1.0 - z) / (1.0 - c)
                }
            }
            Family::Uniform => z,
            Family::WeibullMin => -(-z.powf(s[0])).exp_m1(),
            Family::WeibullMax => (-(-z).powf(s[0])).exp(),
        }
    }

    /// Случайное значение стандартизованного распределения
    ///
    /// Возвращает NaN, если параметры формы недопустимы для генератора.
    pub(crate) fn draw_std<R: Rng + ?Sized>(self, s: &[f64], rng: &mut R) -> f64 {
        if !self.shapes_valid(s) {
            return f64::NAN;
        }
        let u: f64 = rng.sample(Open01);
        match self {
            Family::Alpha => {
                let a = s[0];
                1.0 / (a - norm_ppf(u * norm_cdf(a)))
            }
            Family::Arcsine => (0.5 * PI * u).sin().powi(2),
            Family::Beta => sample_beta(s[0], s[1], rng),
            Family::Cauchy => (PI * (u - 0.5)).tan(),
            Family::Cosine => bisect_ppf(self, s, u, -PI, PI),
            Family::Exponential => -(-u).ln_1p(),
            Family::FisherF => FisherF::new(s[0], s[1])
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
            Family::Gamma => Gamma::new(s[0], 1.0)
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
            Family::Laplace => {
                if u < 0.5 {
                    (2.0 * u).ln()
                } else {
                    -(2.0 * (1.0 - u)).ln()
                }
            }
            Family::Logistic => (u / (1.0 - u)).ln(),
            Family::LogLaplace => {
                let c = s[0];
                if u < 0.5 {
                    (2.0 * u).powf(1.0 / c)
                } else {
                    (2.0 * (1.0 - u)).powf(-1.0 / c)
                }
            }
            Family::LogNormal => LogNormal::new(0.0, s[0])
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
            Family::Normal => rng.sample(StandardNormal),
            Family::Pareto => Pareto::new(1.0, s[0])
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
            Family::PowerLaw => u.powf(1.0 / s[0]),
            Family::PowerNormal => -norm_ppf((1.0 - u).powf(1.0 / s[0])),
            Family::RDist => 2.0 * sample_beta(0.5 * s[0], 0.5 * s[0], rng) - 1.0,
            Family::Reciprocal => s[0] * (s[1] / s[0]).powf(u),
            Family::Semicircular => 2.0 * sample_beta(1.5, 1.5, rng) - 1.0,
            Family::StudentT => StudentT::new(s[0])
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
            Family::Triangular => {
                let c = s[0];
                if u < c {
                    (u * c).sqrt()
                } else {
                    1.0 - ((1.0 - u) * (1.0 - c)).sqrt()
                }
            }
            Family::Uniform => u,
            Family::WeibullMin => Weibull::new(1.0, s[0])
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
            Family::WeibullMax => -Weibull::new(1.0, s[0])
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
        }
    }

    /// Логарифм плотности в точке `x` при полном кортеже параметров
    pub fn ln_pdf(self, x: f64, params: &[f64]) -> f64 {
        match split_params(self, params) {
            Some((shapes, loc, scale)) => {
                self.ln_pdf_std((x - loc) / scale, shapes) - scale.ln()
            }
            None => f64::NAN,
        }
    }

    /// Функция распределения в точке `x` при полном кортеже параметров
    pub fn cdf(self, x: f64, params: &[f64]) -> f64 {
        match split_params(self, params) {
            Some((shapes, loc, scale)) => self.cdf_std((x - loc) / scale, shapes),
            None => f64::NAN,
        }
    }

    /// Случайное значение при полном кортеже параметров
    ///
    /// NaN означает недопустимые параметры.
    pub fn sample<R: Rng + ?Sized>(self, params: &[f64], rng: &mut R) -> f64 {
        match split_params(self, params) {
            Some((shapes, loc, scale)) => loc + scale * self.draw_std(shapes, rng),
            None => f64::NAN,
        }
    }
}

impl From<Family> for &'static str {
    fn from(family: Family) -> Self {
        family.name()
    }
}

impl TryFrom<String> for Family {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Family::from_name(&name).ok_or_else(|| format!("неизвестное семейство: {}", name))
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Разбить кортеж на (формы, loc, scale) с проверкой допустимости
pub(crate) fn split_params(family: Family, params: &[f64]) -> Option<(&[f64], f64, f64)> {
    if params.len() != family.param_count() {
        return None;
    }
    let k = family.shape_count();
    let (shapes, rest) = params.split_at(k);
    let (loc, scale) = (rest[0], rest[1]);
    if !loc.is_finite() || !(scale > 0.0 && scale.is_finite()) || !family.shapes_valid(shapes) {
        return None;
    }
    Some((shapes, loc, scale))
}

fn sample_beta<R: Rng + ?Sized>(a: f64, b: f64, rng: &mut R) -> f64 {
    Beta::new(a, b)
        .map(|d| d.sample(rng))
        .unwrap_or(f64::NAN)
}

/// Квантиль через бисекцию для семейств без явной обратной функции
fn bisect_ppf(family: Family, shapes: &[f64], u: f64, mut low: f64, mut high: f64) -> f64 {
    for _ in 0..64 {
        let mid = 0.5 * (low + high);
        if family.cdf_std(mid, shapes) < u {
            low = mid;
        } else {
            high = mid;
        }
    }
    0.5 * (low + high)
}
