//! # TGen Core (tgen-core)
//!
//! Ядро генератора синтетического трафика: характеризация статистической
//! формы реальных трасс.
//!
//! ## Возможности
//!
//! - **Каталог распределений**: 24 параметрических семейства в форме loc/scale
//! - **Оценка параметров**: метод максимального правдоподобия (замкнутые формулы
//!   или симплекс Нелдера–Мида)
//! - **Критерий согласия**: Колмогорова–Смирнова, выбор семейства по p-value
//!
//! ## Структура
//!
//! - [`sample`]: Эмпирические выборки
//! - [`distribution`]: Семейства распределений
//! - [`fit`]: Подбор лучшего распределения
//! - [`ks`]: Критерий Колмогорова–Смирнова
//! - [`optimize`]: Симплекс-метод
//! - [`error`]: Типы ошибок
//!
//! ## Пример использования
//!
//! ```rust,no_run
//! use tgen_core::{fit_best, EmpiricalSample, DEFAULT_CATALOG};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sizes = EmpiricalSample::from_sizes(&[60, 1514, 1514, 583, 60, 1200])?;
//! let model = fit_best(&sizes, &DEFAULT_CATALOG)?;
//!
//! println!("Оптимальное распределение: {}", model.family);
//! println!("p-value: {}", model.p_value);
//! println!("Параметры: {:?}", model.params);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distribution;
pub mod error;
pub mod fit;
pub mod ks;
pub mod optimize;
pub mod sample;

// Re-экспорт основных типов для удобства
pub use distribution::Family;
pub use error::{FitError, Result, TgenError};
pub use fit::{fit_best, FittedModel, DEFAULT_CATALOG};
pub use sample::{EmpiricalSample, Metric};

/// Версия библиотеки
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
