//! Эмпирические выборки
//!
//! Выборка — упорядоченная последовательность вещественных чисел для одной пары
//! (класс трафика, метрика): размеры пакетов или интервалы между пакетами.
//! После загрузки выборка не изменяется.

use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::error::FitError;

/// Метрика, к которой относится выборка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Размер пакета (байты)
    Size,
    /// Интервал между пакетами (секунды)
    Duration,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Size => write!(f, "packet size"),
            Metric::Duration => write!(f, "timestamp"),
        }
    }
}

/// Неизменяемая эмпирическая выборка
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalSample {
    values: Vec<f64>,
}

/// Сводные характеристики выборки, нужные для стартовых точек подбора
#[derive(Debug, Clone, Copy)]
pub(crate) struct Summary {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Стандартное отклонение с ddof = 0
    pub std: f64,
    pub median: f64,
    pub iqr: f64,
    pub skewness: f64,
}

impl Summary {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

impl EmpiricalSample {
    /// Создать выборку из значений
    ///
    /// Пустые выборки и выборки с NaN/бесконечностями отклоняются.
    pub fn new(values: Vec<f64>) -> Result<Self, FitError> {
        if values.is_empty() {
            return Err(FitError::EmptySample);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FitError::NonFiniteValue { index });
        }
        Ok(Self { values })
    }

    /// Выборка размеров пакетов
    pub fn from_sizes(sizes: &[u64]) -> Result<Self, FitError> {
        Self::new(sizes.iter().map(|&s| s as f64).collect())
    }

    /// Значения выборки
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Количество значений
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Пустая ли выборка (всегда false для корректно созданной)
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Значения в порядке возрастания
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
    }

    /// Проверка на вырожденность: все значения одинаковы
    pub fn ensure_spread(&self) -> Result<(), FitError> {
        let first = self.values[0];
        if self.values.iter().all(|&v| v == first) {
            return Err(FitError::DegenerateSample { value: first });
        }
        Ok(())
    }

    pub(crate) fn summary(&self) -> Summary {
        let n = self.values.len();
        let (min, max) = self
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let mean = self.values.iter().mean();
        let std = self.values.iter().population_std_dev();

        let mut data = Data::new(self.values.clone());
        let median = data.median();
        let iqr = data.interquartile_range();

        let skewness = if std > 0.0 {
            self.values
                .iter()
                .map(|v| ((v - mean) / std).powi(3))
                .sum::<f64>()
                / n as f64
        } else {
            0.0
        };

        Summary {
            n,
            min,
            max,
            mean,
            std,
            median,
            iqr,
            skewness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert_eq!(EmpiricalSample::new(vec![]), Err(FitError::EmptySample));
    }

    #[test]
    fn test_rejects_nan() {
        let err = EmpiricalSample::new(vec![1.0, f64::NAN, 2.0]).unwrap_err();
        assert_eq!(err, FitError::NonFiniteValue { index: 1 });
    }

    #[test]
    fn test_degenerate() {
        let sample = EmpiricalSample::new(vec![0.0; 10]).unwrap();
        assert!(matches!(
            sample.ensure_spread(),
            Err(FitError::DegenerateSample { .. })
        ));

        let sample = EmpiricalSample::new(vec![0.0, 1.0]).unwrap();
        assert!(sample.ensure_spread().is_ok());
    }

    #[test]
    fn test_summary() {
        let sample = EmpiricalSample::from_sizes(&[1, 2, 3, 4, 5]).unwrap();
        let summary = sample.summary();

        assert_eq!(summary.n, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!((summary.std - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((summary.median - 3.0).abs() < 1e-12);
        assert!(summary.skewness.abs() < 1e-12);
    }

    #[test]
    fn test_sorted() {
        let sample = EmpiricalSample::new(vec![3.0, -1.0, 2.0]).unwrap();
        assert_eq!(sample.sorted(), vec![-1.0, 2.0, 3.0]);
        // исходный порядок сохраняется
        assert_eq!(sample.values(), &[3.0, -1.0, 2.0]);
    }
}
