//! Подобранные модели трафика: по паре (размер, интервал) на класс

use serde::{Deserialize, Serialize};
use tracing::info;

use tgen_core::{fit_best, FittedModel, Metric};

use crate::class::TrafficClass;
use crate::error::Result;
use crate::sampler::require_params;
use crate::trace::{ClassTrace, TraceSource};

/// Пара моделей одного класса
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassModels {
    /// Модель размера пакета
    pub size: FittedModel,
    /// Модель интервала между пакетами
    pub duration: FittedModel,
}

/// Шесть моделей: по паре на класс
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSet {
    /// Модели видео
    pub video: ClassModels,
    /// Модели радио
    pub radio: ClassModels,
    /// Модели игры
    pub game: ClassModels,
}

impl ModelSet {
    /// Модели класса
    pub fn get(&self, class: TrafficClass) -> &ClassModels {
        match class {
            TrafficClass::Video => &self.video,
            TrafficClass::Radio => &self.radio,
            TrafficClass::Game => &self.game,
        }
    }

    /// Проверить, что у каждой модели хватает параметров для генератора класса
    pub fn validate(&self) -> Result<()> {
        for class in TrafficClass::ALL {
            let models = self.get(class);
            require_params(class, &models.size, class.size_shape().arity())?;
            require_params(class, &models.duration, class.duration_shape().arity())?;
        }
        Ok(())
    }
}

/// Подобрать пару моделей по трассе класса
pub fn fit_class(
    class: TrafficClass,
    trace: &ClassTrace,
    catalog: &[&str],
) -> Result<ClassModels> {
    let size = fit_best(&trace.size_sample()?, catalog)?;
    info!("{} / {}: {}", class, Metric::Size, size);

    let duration = fit_best(&trace.duration_sample()?, catalog)?;
    info!("{} / {}: {}", class, Metric::Duration, duration);

    Ok(ClassModels { size, duration })
}

/// Загрузить три трассы и подобрать все шесть моделей
///
/// Число параметров здесь не сверяется с генераторами классов: это делают
/// [`ModelSet::validate`] и конструктор симуляции.
pub fn fit_models(
    video: &dyn TraceSource,
    radio: &dyn TraceSource,
    game: &dyn TraceSource,
    catalog: &[&str],
) -> Result<ModelSet> {
    let fit = |class: TrafficClass, source: &dyn TraceSource| -> Result<ClassModels> {
        info!("Подбор моделей для {} по {}", class, source.describe());
        fit_class(class, &source.load()?, catalog)
    };

    Ok(ModelSet {
        video: fit(TrafficClass::Video, video)?,
        radio: fit(TrafficClass::Radio, radio)?,
        game: fit(TrafficClass::Game, game)?,
    })
}
