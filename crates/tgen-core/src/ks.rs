//! Одновыборочный критерий Колмогорова–Смирнова
//!
//! Статистика D = sup |F_n(x) - F(x)| считается по отсортированной выборке,
//! p-value берётся из предельного распределения Колмогорова с поправкой
//! Стивенса для конечного n.

/// Результат критерия
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsOutcome {
    /// Статистика D
    pub statistic: f64,
    /// Двусторонний p-value
    pub p_value: f64,
}

/// Статистика D для отсортированной выборки и функции распределения `cdf`
///
/// Возвращает `None`, если cdf дала нечисловое значение.
pub fn ks_statistic<F>(sorted: &[f64], cdf: F) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let n = sorted.len() as f64;
    let mut d: f64 = 0.0;
    for (i, &x) in sorted.iter().enumerate() {
        let p = cdf(x);
        if !p.is_finite() {
            return None;
        }
        let above = (i + 1) as f64 / n - p;
        let below = p - i as f64 / n;
        d = d.max(above).max(below);
    }
    Some(d)
}

/// Хвост распределения Колмогорова Q(λ) = 2 Σ (-1)^{k-1} exp(-2 k² λ²)
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda < 1e-3 {
        return 1.0;
    }
    if lambda < 1.18 {
        // Ряд для малых λ сходится медленно: используем тэта-представление
        let y = (-std::f64::consts::PI.powi(2) / (8.0 * lambda * lambda)).exp();
        let sum: f64 = (0..8).map(|k| y.powi((2 * k + 1) * (2 * k + 1))).sum();
        let cdf = (2.0 * std::f64::consts::PI).sqrt() / lambda * sum;
        return (1.0 - cdf).clamp(0.0, 1.0);
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * lambda * lambda).exp();
        sum += sign * term;
        if term < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Критерий Колмогорова–Смирнова для отсортированной выборки
pub fn ks_test<F>(sorted: &[f64], cdf: F) -> Option<KsOutcome>
where
    F: Fn(f64) -> f64,
{
    if sorted.is_empty() {
        return None;
    }
    let statistic = ks_statistic(sorted, cdf)?;
    let sqrt_n = (sorted.len() as f64).sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * statistic;
    Some(KsOutcome {
        statistic,
        p_value: kolmogorov_sf(lambda),
    })
}
