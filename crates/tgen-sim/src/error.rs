//! Типы ошибок для tgen-sim

use thiserror::Error;

use tgen_core::TgenError;

use crate::class::TrafficClass;

/// Ошибки симуляции трафика
#[derive(Error, Debug)]
pub enum SimError {
    /// Ошибка ядра (подбор распределений)
    #[error(transparent)]
    Core(#[from] TgenError),

    /// Генератор класса вернул некорректное значение
    #[error("Некорректное значение для класса {class}: {reason}")]
    InvalidSample {
        class: TrafficClass,
        reason: String,
    },

    /// Суммарное время равно нулю, доли удержания не определены
    #[error("Суммарное время симуляции равно нулю: доли удержания не определены")]
    DivisionUndefined,

    /// Некорректная строка таблицы переходов
    #[error("Некорректные пороги переходов для класса {class}: {reason}")]
    InvalidTransition {
        class: TrafficClass,
        reason: String,
    },

    /// Ошибка формата текстовой трассы
    #[error("Ошибка формата трассы в строке {line}: {reason}")]
    TraceFormat { line: usize, reason: String },

    /// Трасса не содержит достаточного количества записей
    #[error("Трасса {0} не содержит достаточного количества записей")]
    EmptyTrace(String),

    /// Ошибка отправки пакета
    #[error("Ошибка отправки пакета: {0}")]
    Transmit(std::io::Error),

    /// Ошибка ввода-вывода
    #[error("Ошибка I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Псевдоним для Result с SimError
pub type Result<T> = std::result::Result<T, SimError>;
