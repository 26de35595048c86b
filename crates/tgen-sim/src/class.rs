//! Классы трафика и закреплённые за ними формы генераторов
//!
//! Форма генератора для каждого класса фиксирована: подобранная модель даёт
//! только параметры, а не семейство. Видео и радио используют генератор Коши
//! для размера пакета, игра — бета-генератор. Для интервалов видео и игра
//! используют арксинус, радио — логнормальный закон.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Класс трафика
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficClass {
    /// Видеостриминг
    Video,
    /// Интернет-радио
    Radio,
    /// Онлайн-игра
    Game,
}

/// Форма генератора размера пакета
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeShape {
    /// Коши: `(loc, scale)`
    Cauchy,
    /// Бета: `(a, b, loc, scale)`
    Beta,
}

/// Форма генератора интервала
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationShape {
    /// Арксинус: `(loc, scale)`
    Arcsine,
    /// Логнормальный: `(s, loc, scale)`
    LogNormal,
}

impl TrafficClass {
    /// Все классы в порядке строк таблицы переходов
    pub const ALL: [TrafficClass; 3] = [
        TrafficClass::Video,
        TrafficClass::Radio,
        TrafficClass::Game,
    ];

    /// Индекс класса (0..3)
    pub fn index(self) -> usize {
        match self {
            TrafficClass::Video => 0,
            TrafficClass::Radio => 1,
            TrafficClass::Game => 2,
        }
    }

    /// Имя класса
    pub fn name(self) -> &'static str {
        match self {
            TrafficClass::Video => "video",
            TrafficClass::Radio => "radio",
            TrafficClass::Game => "game",
        }
    }

    /// Генератор размера пакета для класса
    ///
    /// Радио разделяет генератор с видео.
    pub fn size_shape(self) -> SizeShape {
        match self {
            TrafficClass::Video | TrafficClass::Radio => SizeShape::Cauchy,
            TrafficClass::Game => SizeShape::Beta,
        }
    }

    /// Генератор интервала для класса
    pub fn duration_shape(self) -> DurationShape {
        match self {
            TrafficClass::Video | TrafficClass::Game => DurationShape::Arcsine,
            TrafficClass::Radio => DurationShape::LogNormal,
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TrafficClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(TrafficClass::Video),
            "radio" => Ok(TrafficClass::Radio),
            "game" => Ok(TrafficClass::Game),
            unknown => Err(format!("Неизвестный класс трафика: {}", unknown)),
        }
    }
}

impl SizeShape {
    /// Сколько первых параметров модели использует генератор
    pub fn arity(self) -> usize {
        match self {
            SizeShape::Cauchy => 2,
            SizeShape::Beta => 4,
        }
    }
}

impl DurationShape {
    /// Сколько первых параметров модели использует генератор
    pub fn arity(self) -> usize {
        match self {
            DurationShape::Arcsine => 2,
            DurationShape::LogNormal => 3,
        }
    }
}
