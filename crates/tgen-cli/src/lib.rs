//! # TGen CLI Library
//!
//! Обвязка генератора трафика для командной строки.
//!
//! Предоставляет API для:
//! - Загрузки и проверки конфигурации
//! - Подбора моделей по трассам и их сохранения в JSON
//! - Запуска симуляции с выбранным способом передачи

pub mod config;
pub mod generator;

pub use config::GeneratorConfig;
pub use generator::{load_models, save_models, TrafficGenerator};
