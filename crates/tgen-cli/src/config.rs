//! Конфигурация генератора трафика
//!
//! Этот модуль отвечает за загрузку и валидацию конфигурации. Все поля
//! имеют значения по умолчанию, поэтому пустой файл тоже корректен.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use tgen_core::DEFAULT_CATALOG;
use tgen_sim::{ClampLimits, TrafficClass, TransitionRow, TransitionTable, TransportMode};

/// Конфигурация генератора
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Трассы реального трафика
    #[serde(default)]
    pub traces: TracesConfig,

    /// Марковская цепь классов
    #[serde(default)]
    pub chain: ChainConfig,

    /// Параметры симуляции
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Передача пакетов
    #[serde(default)]
    pub transmission: TransmissionConfig,

    /// Настройки логирования
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Трассы и каталог распределений
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracesConfig {
    /// Трасса видеостриминга
    #[serde(default = "default_video_trace")]
    pub video: PathBuf,

    /// Трасса интернет-радио
    #[serde(default = "default_radio_trace")]
    pub radio: PathBuf,

    /// Трасса онлайн-игры
    #[serde(default = "default_game_trace")]
    pub game: PathBuf,

    /// Сколько записей читать из каждой трассы
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Семейства-кандидаты
    #[serde(default = "default_catalog")]
    pub catalog: Vec<String>,
}

/// Пороги переходов `(t1, t2, 1.0)` для каждого класса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Переходы из video
    #[serde(default = "default_video_row")]
    pub video: TransitionRow,

    /// Переходы из radio
    #[serde(default = "default_radio_row")]
    pub radio: TransitionRow,

    /// Переходы из game
    #[serde(default = "default_game_row")]
    pub game: TransitionRow,

    /// Начальный класс (случайный, если не указан)
    #[serde(default)]
    pub start: Option<TrafficClass>,
}

/// Параметры симуляции
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Число шагов
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Seed генераторов (энтропия ОС, если не указан)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Максимальный интервал (секунды)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f64,

    /// Размер, выше которого пакет ограничивается
    #[serde(default = "default_size_ceiling")]
    pub size_ceiling: i64,

    /// Размер ограниченного пакета
    #[serde(default = "default_size_clamp")]
    pub size_clamp: i64,
}

/// Передача пакетов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionConfig {
    /// Адрес назначения
    #[serde(default = "default_destination")]
    pub destination: IpAddr,

    /// Порт назначения
    #[serde(default = "default_port")]
    pub port: u16,

    /// Режим передачи (udp, dry_run, raw_ip)
    #[serde(default = "default_mode")]
    pub mode: TransportMode,
}

/// Настройки логирования
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Уровень логирования (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Значения по умолчанию
fn default_video_trace() -> PathBuf {
    PathBuf::from("traces/video.txt")
}

fn default_radio_trace() -> PathBuf {
    PathBuf::from("traces/radio.txt")
}

fn default_game_trace() -> PathBuf {
    PathBuf::from("traces/game.txt")
}

fn default_max_records() -> usize {
    5000
}

fn default_catalog() -> Vec<String> {
    DEFAULT_CATALOG.iter().map(|name| name.to_string()).collect()
}

fn default_video_row() -> TransitionRow {
    TransitionTable::default().video
}

fn default_radio_row() -> TransitionRow {
    TransitionTable::default().radio
}

fn default_game_row() -> TransitionRow {
    TransitionTable::default().game
}

fn default_steps() -> usize {
    tgen_sim::DEFAULT_STEPS
}

fn default_max_duration() -> f64 {
    30.0
}

fn default_size_ceiling() -> i64 {
    65535
}

fn default_size_clamp() -> i64 {
    65000
}

fn default_destination() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(8, 0, 0, 1))
}

fn default_port() -> u16 {
    80
}

fn default_mode() -> TransportMode {
    TransportMode::DryRun
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TracesConfig {
    fn default() -> Self {
        Self {
            video: default_video_trace(),
            radio: default_radio_trace(),
            game: default_game_trace(),
            max_records: default_max_records(),
            catalog: default_catalog(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            video: default_video_row(),
            radio: default_radio_row(),
            game: default_game_row(),
            start: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            seed: None,
            max_duration_secs: default_max_duration(),
            size_ceiling: default_size_ceiling(),
            size_clamp: default_size_clamp(),
        }
    }
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            port: default_port(),
            mode: default_mode(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    /// Загрузить конфигурацию из TOML файла
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: GeneratorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Сохранить конфигурацию в TOML файл
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Валидация конфигурации
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        // Проверка таблицы переходов
        self.transition_table().validate()?;

        // Проверка трасс
        if self.traces.max_records < 2 {
            anyhow::bail!("max_records должен быть не меньше 2");
        }
        if self.traces.catalog.is_empty() {
            anyhow::bail!("Каталог распределений не может быть пустым");
        }

        // Проверка симуляции
        if self.simulation.steps == 0 {
            anyhow::bail!("Число шагов должно быть больше 0");
        }
        let max_duration = self.simulation.max_duration_secs;
        if !max_duration.is_finite() || max_duration <= 0.0 {
            anyhow::bail!("max_duration_secs должен быть положительным числом");
        }
        if self.simulation.size_clamp > self.simulation.size_ceiling {
            anyhow::bail!(
                "size_clamp ({}) не может превышать size_ceiling ({})",
                self.simulation.size_clamp,
                self.simulation.size_ceiling
            );
        }

        // Проверка режима передачи
        match self.transmission.mode {
            TransportMode::RawIp => {
                anyhow::bail!("Режим raw_ip не поддерживается, используйте udp или dry_run")
            }
            TransportMode::Udp if self.transmission.port == 0 => {
                anyhow::bail!("Порт назначения не может быть 0");
            }
            _ => {}
        }

        Ok(())
    }

    /// Таблица переходов
    pub fn transition_table(&self) -> TransitionTable {
        TransitionTable {
            video: self.chain.video,
            radio: self.chain.radio,
            game: self.chain.game,
        }
    }

    /// Ограничения на события
    pub fn clamp_limits(&self) -> ClampLimits {
        ClampLimits {
            max_duration_secs: self.simulation.max_duration_secs,
            size_ceiling: self.simulation.size_ceiling,
            size_clamp: self.simulation.size_clamp,
        }
    }

    /// Адрес назначения пакетов
    pub fn destination_address(&self) -> SocketAddr {
        SocketAddr::new(self.transmission.destination, self.transmission.port)
    }

    /// Каталог в виде срезов строк
    pub fn catalog(&self) -> Vec<&str> {
        self.traces.catalog.iter().map(String::as_str).collect()
    }
}
