//! Накопленное время по классам и итоговые доли удержания

use std::fmt;

use serde::Serialize;

use crate::class::TrafficClass;
use crate::error::{Result, SimError};

/// Суммарное время событий каждого класса, секунды
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerClassTimers {
    elapsed: [f64; 3],
}

impl PerClassTimers {
    /// Нулевые таймеры
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить интервал к таймеру класса
    ///
    /// Таймеры не убывают: отрицательные и нечисловые интервалы отвергаются.
    pub fn add(&mut self, class: TrafficClass, duration: f64) -> Result<()> {
        if duration.is_nan() || duration < 0.0 {
            return Err(SimError::InvalidSample {
                class,
                reason: format!("интервал {} нельзя добавить к таймеру", duration),
            });
        }
        self.elapsed[class.index()] += duration;
        Ok(())
    }

    /// Время класса
    pub fn get(&self, class: TrafficClass) -> f64 {
        self.elapsed[class.index()]
    }

    /// Сумма по всем классам
    pub fn total(&self) -> f64 {
        self.elapsed.iter().sum()
    }

    /// Доли удержания
    pub fn report(&self) -> Result<RetentionReport> {
        let total = self.total();
        if total == 0.0 {
            return Err(SimError::DivisionUndefined);
        }
        Ok(RetentionReport {
            elapsed: self.elapsed,
            fractions: self.elapsed.map(|t| t / total),
            total,
        })
    }
}

/// Доли времени, проведённого в каждом классе
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetentionReport {
    elapsed: [f64; 3],
    fractions: [f64; 3],
    total: f64,
}

impl RetentionReport {
    /// Доля класса
    pub fn fraction(&self, class: TrafficClass) -> f64 {
        self.fractions[class.index()]
    }

    /// Время класса, секунды
    pub fn elapsed(&self, class: TrafficClass) -> f64 {
        self.elapsed[class.index()]
    }

    /// Общее время, секунды
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl fmt::Display for RetentionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in TrafficClass::ALL.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} retention: {}", class, self.fraction(*class))?;
        }
        Ok(())
    }
}
