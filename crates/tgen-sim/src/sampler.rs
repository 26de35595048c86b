//! Генерация синтетических событий (размер пакета + интервал)
//!
//! Подобранная модель даёт только кортеж параметров. Форма генератора
//! определяется классом трафика (см. [`TrafficClass::size_shape`] и
//! [`TrafficClass::duration_shape`]), параметры берутся по позиции.

use rand::Rng;
use rand_distr::{Beta, Cauchy, Distribution, LogNormal};
use tracing::warn;

use tgen_core::FittedModel;

use crate::class::{DurationShape, SizeShape, TrafficClass};
use crate::error::{Result, SimError};

/// Ограничения на сгенерированные значения
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampLimits {
    /// Максимальный интервал, секунды
    pub max_duration_secs: f64,
    /// Размер, выше которого срабатывает ограничение
    pub size_ceiling: i64,
    /// Размер, которым заменяется слишком большой пакет
    pub size_clamp: i64,
}

impl Default for ClampLimits {
    fn default() -> Self {
        Self {
            max_duration_secs: 30.0,
            size_ceiling: 65535,
            size_clamp: 65000,
        }
    }
}

/// Одно сгенерированное событие
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledEvent {
    /// Размер пакета, байты
    pub size: i64,
    /// Интервал до следующего события, секунды
    pub duration: f64,
    /// Размер был ограничен
    pub size_clamped: bool,
    /// Интервал был ограничен
    pub duration_clamped: bool,
}

/// Генератор событий
#[derive(Debug, Clone, Default)]
pub struct EventSampler {
    limits: ClampLimits,
}

impl EventSampler {
    /// Создать генератор с заданными ограничениями
    pub fn new(limits: ClampLimits) -> Self {
        Self { limits }
    }

    /// Текущие ограничения
    pub fn limits(&self) -> &ClampLimits {
        &self.limits
    }

    /// Сгенерировать событие для класса
    pub fn sample_event<R: Rng + ?Sized>(
        &self,
        class: TrafficClass,
        size_model: &FittedModel,
        duration_model: &FittedModel,
        rng: &mut R,
    ) -> Result<SampledEvent> {
        let raw_size = draw_size(class, size_model, rng)?;
        let raw_duration = draw_duration(class, duration_model, rng)?;

        if !raw_size.is_finite() {
            return Err(invalid(class, format!("размер пакета {}", raw_size)));
        }
        if raw_duration.is_nan() || raw_duration < 0.0 {
            return Err(invalid(class, format!("интервал {}", raw_duration)));
        }

        // Дробная часть отбрасывается до проверки ограничения
        let mut size = raw_size as i64;
        let size_clamped = size > self.limits.size_ceiling;
        if size_clamped {
            warn!(
                "Класс {}: размер {} ограничен до {}",
                class, size, self.limits.size_clamp
            );
            size = self.limits.size_clamp;
        }

        let mut duration = raw_duration;
        let duration_clamped = duration > self.limits.max_duration_secs;
        if duration_clamped {
            warn!(
                "Класс {}: интервал {} с ограничен до {} с",
                class, duration, self.limits.max_duration_secs
            );
            duration = self.limits.max_duration_secs;
        }

        Ok(SampledEvent {
            size,
            duration,
            size_clamped,
            duration_clamped,
        })
    }
}

fn invalid(class: TrafficClass, reason: String) -> SimError {
    SimError::InvalidSample { class, reason }
}

pub(crate) fn require_params(class: TrafficClass, model: &FittedModel, arity: usize) -> Result<()> {
    if model.params.len() < arity {
        return Err(invalid(
            class,
            format!(
                "модели {} нужно не меньше {} параметров, получено {}",
                model.family,
                arity,
                model.params.len()
            ),
        ));
    }
    Ok(())
}

fn draw_size<R: Rng + ?Sized>(
    class: TrafficClass,
    model: &FittedModel,
    rng: &mut R,
) -> Result<f64> {
    let shape = class.size_shape();
    require_params(class, model, shape.arity())?;
    let p = &model.params;

    match shape {
        SizeShape::Cauchy => {
            let cauchy = Cauchy::new(p[0], p[1])
                .map_err(|e| invalid(class, format!("Коши({}, {}): {}", p[0], p[1], e)))?;
            Ok(cauchy.sample(rng))
        }
        SizeShape::Beta => {
            let (a, b, loc, scale) = (p[0], p[1], p[2], p[3]);
            let beta = Beta::new(a, b)
                .map_err(|e| invalid(class, format!("бета({}, {}): {}", a, b, e)))?;
            Ok(loc + scale * beta.sample(rng))
        }
    }
}

fn draw_duration<R: Rng + ?Sized>(
    class: TrafficClass,
    model: &FittedModel,
    rng: &mut R,
) -> Result<f64> {
    let shape = class.duration_shape();
    require_params(class, model, shape.arity())?;
    let p = &model.params;

    match shape {
        DurationShape::Arcsine => {
            // Арксинус на [loc, loc + scale] это бета(1/2, 1/2)
            let (loc, scale) = (p[0], p[1]);
            let beta = Beta::<f64>::new(0.5, 0.5)
                .map_err(|e| invalid(class, format!("арксинус: {}", e)))?;
            Ok(loc + scale * beta.sample(rng))
        }
        DurationShape::LogNormal => {
            let (s, loc, scale) = (p[0], p[1], p[2]);
            if scale.is_nan() || scale <= 0.0 {
                return Err(invalid(class, format!("логнормальный масштаб {}", scale)));
            }
            let lognormal = LogNormal::new(scale.ln(), s)
                .map_err(|e| invalid(class, format!("логнормальный s = {}: {}", s, e)))?;
            Ok(loc + lognormal.sample(rng))
        }
    }
}
