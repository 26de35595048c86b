//! # TGen Sim (tgen-sim)
//!
//! Симуляция синтетического трафика по подобранным моделям.
//!
//! Последовательность классов (видео, радио, игра) задаёт марковская цепь,
//! размер пакета и интервал каждого события берутся из генераторов,
//! закреплённых за классом. Драйвер копит время по классам и в конце
//! выдаёт доли удержания.
//!
//! ## Структура
//!
//! - [`class`]: Классы трафика и формы генераторов
//! - [`markov`]: Таблица переходов и цепь
//! - [`sampler`]: Генерация событий с ограничениями
//! - [`models`]: Подбор шести моделей по трассам
//! - [`trace`]: Загрузка трасс
//! - [`sink`]: Передача пакетов
//! - [`retention`]: Таймеры и доли удержания
//! - [`driver`]: Пошаговая симуляция
//!
//! ## Пример использования
//!
//! ```rust,no_run
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use tgen_core::DEFAULT_CATALOG;
//! use tgen_sim::{
//!     fit_models, DryRunSink, MarkovChain, Simulation, SimulationState, TextTrace,
//!     TrafficClass, TransitionTable,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let models = fit_models(
//!     &TextTrace::new("traces/video.txt", 5000),
//!     &TextTrace::new("traces/radio.txt", 5000),
//!     &TextTrace::new("traces/game.txt", 5000),
//!     &DEFAULT_CATALOG,
//! )?;
//!
//! let chain = MarkovChain::new(TransitionTable::default(), TrafficClass::Video)?;
//! let mut sim = Simulation::new(
//!     models,
//!     SimulationState::new(chain),
//!     DryRunSink::new(),
//!     StdRng::seed_from_u64(1),
//!     StdRng::seed_from_u64(2),
//! )?;
//!
//! let report = sim.run().await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod class;
pub mod driver;
pub mod error;
pub mod markov;
pub mod models;
pub mod retention;
pub mod sampler;
pub mod sink;
pub mod trace;

// Re-экспорт основных типов
pub use class::TrafficClass;
pub use driver::{Simulation, SimulationState, StepRecord, DEFAULT_STEPS};
pub use error::{Result, SimError};
pub use markov::{MarkovChain, TransitionRow, TransitionTable};
pub use models::{fit_class, fit_models, ClassModels, ModelSet};
pub use retention::{PerClassTimers, RetentionReport};
pub use sampler::{ClampLimits, EventSampler, SampledEvent};
pub use sink::{DryRunSink, PacketSink, RecordingSink, TransportMode, UdpSink};
pub use trace::{ClassTrace, TextTrace, TraceSource};

/// Версия библиотеки
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
