//! Типы ошибок для tgen-core
//!
//! Этот модуль содержит ошибки подбора распределений и ошибки верхнего уровня,
//! которые возникают при построении моделей трафика.

use thiserror::Error;

/// Основной тип ошибок ядра генератора трафика
#[derive(Error, Debug)]
pub enum TgenError {
    /// Ни одно распределение из каталога не удалось подобрать
    #[error("Ни одно распределение не подошло к выборке (проверено семейств: {tried})")]
    NoFittableDistribution { tried: usize },

    /// Ошибка подбора конкретного семейства
    #[error("Ошибка подбора распределения: {0}")]
    Fit(#[from] FitError),

    /// Ошибка ввода-вывода
    #[error("Ошибка I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Общая ошибка
    #[error("Общая ошибка: {0}")]
    Other(String),
}

/// Ошибки подбора одного семейства распределений
///
/// Такие ошибки не фатальны: семейство просто исключается из поиска.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Семейство с таким именем не существует
    #[error("Неизвестное семейство распределений: {0}")]
    UnknownFamily(String),

    /// Пустая выборка
    #[error("Пустая выборка")]
    EmptySample,

    /// Выборка вырождена (все значения совпадают)
    #[error("Вырожденная выборка: все значения равны {value}")]
    DegenerateSample { value: f64 },

    /// В выборке есть NaN или бесконечность
    #[error("Выборка содержит нечисловое значение в позиции {index}")]
    NonFiniteValue { index: usize },

    /// Подбор или тест дал нечисловой результат
    #[error("Нечисловой результат для семейства {family}")]
    NonFinite { family: &'static str },

    /// Параметры вне области определения семейства
    #[error("Некорректные параметры для {family}: {reason}")]
    InvalidParameters {
        family: &'static str,
        reason: String,
    },

    /// Оптимизатор не нашёл точку, покрывающую всю выборку
    #[error("Оптимизация для {family} не нашла допустимых параметров за {iterations} итераций")]
    NoConvergence {
        family: &'static str,
        iterations: usize,
    },
}

/// Псевдоним для Result с ошибкой ядра
pub type Result<T> = std::result::Result<T, TgenError>;

impl From<&str> for TgenError {
    fn from(s: &str) -> Self {
        TgenError::Other(s.to_string())
    }
}

impl From<String> for TgenError {
    fn from(s: String) -> Self {
        TgenError::Other(s)
    }
}
