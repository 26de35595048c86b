//! Подбор распределений по эмпирической выборке
//!
//! Для каждого семейства каталога оцениваются параметры методом
//! максимального правдоподобия, затем считается p-value критерия
//! Колмогорова–Смирнова. Лучшим считается семейство с максимальным p-value;
//! при равенстве побеждает первое в порядке каталога.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::distribution::family::split_params;
use crate::distribution::{Family, Support};
use crate::error::{FitError, Result, TgenError};
use crate::ks::ks_test;
use crate::optimize::NelderMead;
use crate::sample::{EmpiricalSample, Summary};

/// Каталог семейств-кандидатов в фиксированном порядке
///
/// Имя `pow` не соответствует ни одному семейству и всегда исключается.
pub const DEFAULT_CATALOG: [&str; 25] = [
    "alpha",
    "arcsine",
    "beta",
    "cauchy",
    "cosine",
    "expon",
    "pow",
    "f",
    "gamma",
    "laplace",
    "logistic",
    "loglaplace",
    "lognorm",
    "norm",
    "pareto",
    "powerlaw",
    "powernorm",
    "rdist",
    "reciprocal",
    "semicircular",
    "t",
    "triang",
    "uniform",
    "weibull_min",
    "weibull_max",
];

/// Штраф за каждую точку вне носителя: 100 · ln(f64::MAX)
const OUT_OF_SUPPORT_PENALTY: f64 = 100.0 * 709.782_712_893_384;

/// Относительный отступ стартовых границ от крайних точек выборки
const EDGE_MARGIN: f64 = 0.01;

/// Подобранная модель распределения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Семейство
    pub family: Family,
    /// Параметры `[формы..., loc, scale]`
    pub params: Vec<f64>,
    /// p-value критерия Колмогорова–Смирнова
    pub p_value: f64,
}

impl FittedModel {
    /// Создать модель с заданными параметрами (без подбора)
    pub fn new(family: Family, params: Vec<f64>, p_value: f64) -> Self {
        Self {
            family,
            params,
            p_value,
        }
    }

    /// Параметр формы по имени
    ///
    /// `None`, если такого параметра нет или кортеж параметров недопустим.
    pub fn shape(&self, name: &str) -> Option<f64> {
        let (shapes, _, _) = split_params(self.family, &self.params)?;
        self.family
            .shape_names()
            .iter()
            .position(|&s| s == name)
            .map(|i| shapes[i])
    }

    /// Параметр положения
    pub fn loc(&self) -> Option<f64> {
        split_params(self.family, &self.params).map(|(_, loc, _)| loc)
    }

    /// Параметр масштаба
    pub fn scale(&self) -> Option<f64> {
        split_params(self.family, &self.params).map(|(_, _, scale)| scale)
    }
}

impl std::fmt::Display for FittedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| format!("{}", p)).collect();
        write!(
            f,
            "{} (p = {}, params = ({}))",
            self.family,
            self.p_value,
            params.join(", ")
        )
    }
}

/// Оценить параметры одного семейства
pub fn fit_family(
    family: Family,
    sample: &EmpiricalSample,
) -> std::result::Result<Vec<f64>, FitError> {
    sample.ensure_spread()?;
    let summary = sample.summary();

    let params = match family {
        Family::Normal => vec![summary.mean, summary.std],
        Family::Exponential => vec![summary.min, summary.mean - summary.min],
        Family::Uniform => vec![summary.min, summary.range()],
        Family::Arcsine => {
            // правдоподобие неограниченно у концов носителя: берутся крайние точки
            let pad = summary.range() / (summary.n as f64).powi(2);
            vec![summary.min - pad, summary.range() + 2.0 * pad]
        }
        Family::Laplace => {
            let scale = sample
                .values()
                .iter()
                .map(|x| (x - summary.median).abs())
                .sum::<f64>()
                / summary.n as f64;
            vec![summary.median, scale]
        }
        _ => maximize_likelihood(family, sample, &summary)?,
    };

    if params.iter().any(|p| !p.is_finite()) {
        return Err(FitError::NonFinite {
            family: family.name(),
        });
    }
    if split_params(family, &params).is_none() {
        return Err(FitError::InvalidParameters {
            family: family.name(),
            reason: format!("{:?}", params),
        });
    }
    Ok(params)
}

/// p-value критерия Колмогорова–Смирнова для выборки и параметров
pub fn goodness_of_fit(
    family: Family,
    sample: &EmpiricalSample,
    params: &[f64],
) -> std::result::Result<f64, FitError> {
    let sorted = sample.sorted();
    let outcome = ks_test(&sorted, |x| family.cdf(x, params)).ok_or(FitError::NonFinite {
        family: family.name(),
    })?;
    if !outcome.p_value.is_finite() {
        return Err(FitError::NonFinite {
            family: family.name(),
        });
    }
    Ok(outcome.p_value)
}

/// Подобрать одно семейство и оценить качество подбора
pub fn fit_candidate(
    name: &str,
    sample: &EmpiricalSample,
) -> std::result::Result<FittedModel, FitError> {
    let family =
        Family::from_name(name).ok_or_else(|| FitError::UnknownFamily(name.to_string()))?;
    let params = fit_family(family, sample)?;
    let p_value = goodness_of_fit(family, sample, &params)?;
    Ok(FittedModel::new(family, params, p_value))
}

/// Выбрать лучшее распределение из каталога
///
/// Ошибки отдельных семейств не фатальны; `NoFittableDistribution`
/// возвращается, только если не подошло ни одно.
pub fn fit_best(sample: &EmpiricalSample, candidates: &[&str]) -> Result<FittedModel> {
    let mut best: Option<FittedModel> = None;

    for name in candidates {
        match fit_candidate(name, sample) {
            Ok(model) => {
                debug!("{}: p = {}", name, model.p_value);
                keep_better(&mut best, model);
            }
            Err(e) => {
                debug!("Семейство {} исключено: {}", name, e);
            }
        }
    }

    let best = best.ok_or(TgenError::NoFittableDistribution {
        tried: candidates.len(),
    })?;
    info!("Оптимальное распределение: {}", best);
    Ok(best)
}

/// Заменить лучшую модель, только если p-value кандидата строго больше
fn keep_better(best: &mut Option<FittedModel>, candidate: FittedModel) {
    if best.as_ref().map_or(true, |b| candidate.p_value > b.p_value) {
        *best = Some(candidate);
    }
}

/// Штрафованное отрицательное логарифмическое правдоподобие
fn penalized_nll(family: Family, values: &[f64], params: &[f64]) -> f64 {
    let Some((shapes, loc, scale)) = split_params(family, params) else {
        return f64::INFINITY;
    };
    let mut total = 0.0;
    let mut good = 0usize;
    let mut bad = 0usize;
    for &x in values {
        let lp = family.ln_pdf_std((x - loc) / scale, shapes);
        if lp.is_finite() {
            total -= lp;
            good += 1;
        } else {
            bad += 1;
        }
    }
    total + good as f64 * scale.ln() + bad as f64 * OUT_OF_SUPPORT_PENALTY
}

fn maximize_likelihood(
    family: Family,
    sample: &EmpiricalSample,
    summary: &Summary,
) -> std::result::Result<Vec<f64>, FitError> {
    // Поиск идёт в единицах разброса выборки: IQR, иначе std, иначе размах
    let center = summary.median;
    let width = positive_or(summary.iqr, positive_or(summary.std, summary.range()));
    let k = family.shape_count();

    let values: Vec<f64> = sample.values().iter().map(|x| (x - center) / width).collect();
    let mut start = initial_params(family, summary);
    start[k] = (start[k] - center) / width;
    start[k + 1] /= width;

    let minimum = NelderMead::default().minimize(|p| penalized_nll(family, &values, p), &start);
    if !minimum.value.is_finite() {
        return Err(FitError::NoConvergence {
            family: family.name(),
            iterations: minimum.iterations,
        });
    }

    let mut params = minimum.point;
    params[k] = center + width * params[k];
    params[k + 1] *= width;
    Ok(params)
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Стартовая точка оптимизации `[формы..., loc, scale]`
fn initial_params(family: Family, s: &Summary) -> Vec<f64> {
    let margin = EDGE_MARGIN * s.range();
    let spread = positive_or(s.std, s.range() / 4.0);

    let mut params = match family {
        Family::Beta => {
            // метод моментов на выборке, нормированной к [min, max]
            let lo = s.min - margin;
            let width = s.range() + 2.0 * margin;
            let m = (s.mean - lo) / width;
            let v = (s.std / width).powi(2);
            let common = positive_or(m * (1.0 - m) / v - 1.0, 2.0);
            vec![positive_or(m * common, 1.0), positive_or((1.0 - m) * common, 1.0)]
        }
        Family::Gamma => vec![(4.0 / (s.skewness * s.skewness)).clamp(0.5, 200.0)],
        Family::FisherF => vec![2.0, 10.0],
        Family::StudentT => vec![5.0],
        Family::RDist => vec![2.0],
        Family::Reciprocal => vec![1.0, std::f64::consts::E],
        Family::Triangular => {
            let m = (s.mean - s.min) / s.range();
            vec![(3.0 * m - 1.0).clamp(0.01, 0.99)]
        }
        Family::WeibullMin | Family::WeibullMax => vec![1.5],
        Family::LogNormal => vec![1.0],
        _ => vec![1.0; family.shape_count()],
    };

    let support = family.support(&params);
    let (loc, scale) = match family {
        Family::Gamma => {
            let a = params[0];
            let scale = spread / a.sqrt();
            let loc = (s.mean - a * scale).min(s.min - margin);
            (loc, scale)
        }
        Family::LogNormal => {
            // моменты логнормального закона: E = scale·e^{s²/2}, CV² = e^{s²} - 1
            let loc = s.min - margin;
            let shifted_mean = s.mean - loc;
            let sigma = (s.std / shifted_mean).powi(2).ln_1p().sqrt();
            params[0] = positive_or(sigma, 1.0);
            (loc, shifted_mean / (0.5 * params[0] * params[0]).exp())
        }
        Family::Cauchy => (s.median, positive_or(s.iqr / 2.0, spread)),
        Family::Logistic => (s.mean, spread * 3.0_f64.sqrt() / std::f64::consts::PI),
        Family::StudentT => (s.median, spread * (3.0_f64 / 5.0).sqrt()),
        Family::WeibullMin => {
            let loc = s.min - margin;
            (loc, positive_or(s.mean - loc, spread))
        }
        Family::WeibullMax => {
            let loc = s.max + margin;
            (loc, positive_or(loc - s.mean, spread))
        }
        _ => cover_support(support, s, margin, spread),
    };

    params.push(loc);
    params.push(scale);
    params
}

/// loc/scale, при которых стандартизованный носитель накрывает выборку
fn cover_support(support: Support, s: &Summary, margin: f64, spread: f64) -> (f64, f64) {
    match (support.bounded_below(), support.bounded_above()) {
        (true, true) => {
            let scale = (s.range() + 2.0 * margin) / (support.high - support.low);
            (s.min - margin - support.low * scale, scale)
        }
        (true, false) => {
            let scale = positive_or(s.median - s.min + margin, spread);
            (s.min - margin - support.low * scale, scale)
        }
        (false, true) => {
            let scale = positive_or(s.max - s.median + margin, spread);
            (s.max + margin - support.high * scale, scale)
        }
        (false, false) => (s.mean, spread),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Beta, Cauchy, Distribution, Exp, LogNormal, Normal};

    fn sample_from<D: Distribution<f64>>(dist: D, n: usize, seed: u64) -> EmpiricalSample {
        let mut rng = StdRng::seed_from_u64(seed);
        EmpiricalSample::new((0..n).map(|_| dist.sample(&mut rng)).collect()).unwrap()
    }

    #[test]
    fn test_normal_closed_form() {
        let sample = sample_from(Normal::new(5.0, 2.0).unwrap(), 2000, 1);
        let params = fit_family(Family::Normal, &sample).unwrap();

        assert!((params[0] - 5.0).abs() < 0.2);
        assert!((params[1] - 2.0).abs() < 0.2);
    }

    #[test]
    fn test_uniform_closed_form() {
        let sample = EmpiricalSample::new(vec![2.0, 3.0, 7.0, 4.0]).unwrap();
        let params = fit_family(Family::Uniform, &sample).unwrap();
        assert_eq!(params, vec![2.0, 5.0]);
    }

    #[test]
    fn test_exponential_closed_form() {
        let sample = EmpiricalSample::new(vec![1.0, 2.0, 3.0]).unwrap();
        let params = fit_family(Family::Exponential, &sample).unwrap();
        assert_eq!(params, vec![1.0, 1.0]);
    }

    #[test]
    fn test_cauchy_mle() {
        let sample = sample_from(Cauchy::new(100.0, 10.0).unwrap(), 2000, 2);
        let params = fit_family(Family::Cauchy, &sample).unwrap();

        assert!((params[0] - 100.0).abs() < 1.5, "loc = {}", params[0]);
        assert!((params[1] - 10.0).abs() < 1.5, "scale = {}", params[1]);
    }

    #[test]
    fn test_mle_beats_start_point() {
        let sample = sample_from(Exp::new(2.0).unwrap(), 500, 3);
        let summary = sample.summary();
        let start = initial_params(Family::WeibullMin, &summary);
        let fitted = fit_family(Family::WeibullMin, &sample).unwrap();

        let before = penalized_nll(Family::WeibullMin, sample.values(), &start);
        let after = penalized_nll(Family::WeibullMin, sample.values(), &fitted);
        assert!(after <= before);
        assert!(after < OUT_OF_SUPPORT_PENALTY);
    }

    #[test]
    fn test_start_points_cover_sample() {
        let sample = sample_from(Normal::new(50.0, 5.0).unwrap(), 300, 4);
        let summary = sample.summary();
        for family in Family::ALL {
            let start = initial_params(family, &summary);
            assert_eq!(start.len(), family.param_count(), "{}", family);
            assert!(
                split_params(family, &start).is_some(),
                "{}: недопустимая стартовая точка {:?}",
                family,
                start
            );
        }
    }

    /// Семейства, заведомо непохожие на проверяемые
    const CONTRAST: [&str; 4] = ["norm", "uniform", "expon", "laplace"];

    fn sample_with<F>(n: usize, seed: u64, mut draw: F) -> EmpiricalSample
    where
        F: FnMut(&mut StdRng) -> f64,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        EmpiricalSample::new((0..n).map(|_| draw(&mut rng)).collect()).unwrap()
    }

    fn with_contrast(name: &'static str) -> Vec<&'static str> {
        let mut catalog = CONTRAST.to_vec();
        catalog.push(name);
        catalog
    }

    fn assert_params_near(model: &FittedModel, expected: &[f64], tolerance: &[f64]) {
        assert_eq!(model.params.len(), expected.len(), "{}", model);
        for (i, (got, want)) in model.params.iter().zip(expected).enumerate() {
            assert!(
                (got - want).abs() <= tolerance[i],
                "{}: параметр {} = {}, ожидалось {} ± {}",
                model.family,
                i,
                got,
                want,
                tolerance[i]
            );
        }
    }

    #[test]
    fn test_fit_best_recovers_cauchy() {
        let sample = sample_from(Cauchy::new(100.0, 10.0).unwrap(), 2000, 2);

        let model = fit_best(&sample, &with_contrast("cauchy")).unwrap();
        assert_eq!(model.family, Family::Cauchy);
        assert!(model.p_value > 1e-3, "{}", model);
        assert_params_near(&model, &[100.0, 10.0], &[1.0, 1.0]);

        // t с малым числом степеней свободы неотличимо от Коши
        let best = fit_best(&sample, &DEFAULT_CATALOG).unwrap();
        assert!(
            matches!(best.family, Family::Cauchy | Family::StudentT),
            "{}",
            best
        );
    }

    #[test]
    fn test_fit_best_recovers_arcsine() {
        let sample = sample_with(2000, 8, |rng| Family::Arcsine.sample(&[0.0, 0.05], rng));

        let model = fit_best(&sample, &with_contrast("arcsine")).unwrap();
        assert_eq!(model.family, Family::Arcsine);
        assert!(model.p_value > 1e-3, "{}", model);
        assert_params_near(&model, &[0.0, 0.05], &[2e-4, 5e-4]);

        // beta(½, ½) и rdist(c = 1) задают тот же закон
        let best = fit_best(&sample, &DEFAULT_CATALOG).unwrap();
        assert!(
            matches!(best.family, Family::Arcsine | Family::Beta | Family::RDist),
            "{}",
            best
        );
    }

    #[test]
    fn test_fit_best_recovers_lognormal() {
        // масштаб интервалов между пакетами: десятки миллисекунд
        let dist = LogNormal::<f64>::new(0.02_f64.ln(), 0.5).unwrap();
        let sample = sample_from(dist, 2000, 9);

        let model = fit_best(&sample, &with_contrast("lognorm")).unwrap();
        assert_eq!(model.family, Family::LogNormal);
        assert!(model.p_value > 1e-3, "{}", model);
        assert_params_near(&model, &[0.5, 0.0, 0.02], &[0.06, 0.002, 0.002]);
    }

    #[test]
    fn test_fit_best_recovers_beta() {
        let dist = Beta::<f64>::new(2.0, 5.0).unwrap();
        let sample = sample_with(3000, 10, |rng| 60.0 + 1400.0 * dist.sample(rng));

        let model = fit_best(&sample, &with_contrast("beta")).unwrap();
        assert_eq!(model.family, Family::Beta);
        assert!(model.p_value > 1e-3, "{}", model);
        // формы коррелируют с масштабом, поэтому допуски для них шире
        assert_params_near(&model, &[2.0, 5.0, 60.0, 1400.0], &[0.4, 1.75, 20.0, 210.0]);
    }

    #[test]
    fn test_fit_best_rejects_wrong_shape() {
        let sample = sample_from(Normal::new(10.0, 3.0).unwrap(), 2000, 5);
        let normal = fit_candidate("norm", &sample).unwrap();
        let uniform = fit_candidate("uniform", &sample).unwrap();

        assert!(normal.p_value > 1e-3);
        assert!(uniform.p_value < 1e-3);
        assert_eq!(fit_best(&sample, &CONTRAST).unwrap().family, Family::Normal);
    }

    #[test]
    fn test_unknown_family_is_skipped() {
        let sample = sample_from(Normal::new(0.0, 1.0).unwrap(), 200, 6);
        assert_eq!(
            fit_candidate("pow", &sample).unwrap_err(),
            FitError::UnknownFamily("pow".to_string())
        );

        let best = fit_best(&sample, &["pow", "norm"]).unwrap();
        assert_eq!(best.family, Family::Normal);
    }

    #[test]
    fn test_degenerate_sample() {
        let sample = EmpiricalSample::new(vec![0.0; 50]).unwrap();
        let err = fit_best(&sample, &DEFAULT_CATALOG).unwrap_err();
        assert!(matches!(err, TgenError::NoFittableDistribution { tried: 25 }));

        let sample = EmpiricalSample::new(vec![42.0]).unwrap();
        assert!(matches!(
            fit_best(&sample, &DEFAULT_CATALOG),
            Err(TgenError::NoFittableDistribution { .. })
        ));
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let normal = FittedModel::new(Family::Normal, vec![0.0, 1.0], 0.5);
        let logistic = FittedModel::new(Family::Logistic, vec![0.0, 1.0], 0.5);
        let cauchy = FittedModel::new(Family::Cauchy, vec![0.0, 1.0], 0.3);

        let mut best = None;
        for model in [normal.clone(), logistic.clone(), cauchy.clone()] {
            keep_better(&mut best, model);
        }
        assert_eq!(best.as_ref(), Some(&normal));

        // тот же набор в другом порядке: побеждает первый из равных
        let mut best = None;
        for model in [cauchy, logistic.clone(), normal] {
            keep_better(&mut best, model);
        }
        assert_eq!(best, Some(logistic));
    }

    #[test]
    fn test_model_accessors() {
        let model = FittedModel::new(Family::Beta, vec![2.0, 3.0, 10.0, 100.0], 0.5);
        assert_eq!(model.shape("a"), Some(2.0));
        assert_eq!(model.shape("b"), Some(3.0));
        assert_eq!(model.shape("c"), None);
        assert_eq!(model.loc(), Some(10.0));
        assert_eq!(model.scale(), Some(100.0));

        // укороченный кортеж из JSON не должен приводить к панике
        let short: FittedModel =
            serde_json::from_str(r#"{"family":"beta","params":[2.0],"p_value":0.5}"#).unwrap();
        assert_eq!(short.shape("a"), None);
        assert_eq!(short.loc(), None);
        assert_eq!(short.scale(), None);
    }

    #[test]
    fn test_model_serde() {
        let model = FittedModel::new(Family::LogNormal, vec![0.5, 0.0, 1.0], 0.9);
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"lognorm\""));
        let back: FittedModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
