//! Драйвер симуляции
//!
//! Каждый шаг: сгенерировать событие для текущего класса, добавить интервал
//! к таймеру класса, передать пакет, выждать интервал в реальном времени и
//! сделать переход цепи. После заданного числа шагов считаются доли
//! удержания.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::time::sleep;
use tracing::info;

use crate::class::TrafficClass;
use crate::error::{Result, SimError};
use crate::markov::MarkovChain;
use crate::models::ModelSet;
use crate::retention::{PerClassTimers, RetentionReport};
use crate::sampler::{ClampLimits, EventSampler};
use crate::sink::PacketSink;

/// Число шагов по умолчанию
pub const DEFAULT_STEPS: usize = 100;

/// Изменяемое состояние симуляции
#[derive(Debug, Clone)]
pub struct SimulationState {
    chain: MarkovChain,
    timers: PerClassTimers,
    steps_done: usize,
}

impl SimulationState {
    /// Начальное состояние с нулевыми таймерами
    pub fn new(chain: MarkovChain) -> Self {
        Self {
            chain,
            timers: PerClassTimers::new(),
            steps_done: 0,
        }
    }

    /// Марковская цепь
    pub fn chain(&self) -> &MarkovChain {
        &self.chain
    }

    /// Таймеры классов
    pub fn timers(&self) -> &PerClassTimers {
        &self.timers
    }

    /// Текущий класс
    pub fn current_state(&self) -> TrafficClass {
        self.chain.current_state()
    }

    /// Выполнено шагов
    pub fn steps_done(&self) -> usize {
        self.steps_done
    }
}

/// Запись об одном шаге
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Номер шага, с нуля
    pub step: usize,
    /// Класс, для которого сгенерировано событие
    pub class: TrafficClass,
    /// Класс после перехода
    pub next: TrafficClass,
    /// Размер пакета
    pub size: i64,
    /// Интервал, секунды
    pub duration: f64,
}

/// Симуляция трафика
///
/// `T` — источник чисел для переходов цепи, события генерируются из
/// отдельного `StdRng`.
pub struct Simulation<S, T = StdRng> {
    models: ModelSet,
    sampler: EventSampler,
    state: SimulationState,
    sink: S,
    transition_rng: T,
    event_rng: StdRng,
    steps: usize,
    history: Vec<StepRecord>,
}

impl<S, T> Simulation<S, T>
where
    S: PacketSink,
    T: Rng,
{
    /// Создать симуляцию на `DEFAULT_STEPS` шагов
    pub fn new(
        models: ModelSet,
        state: SimulationState,
        sink: S,
        transition_rng: T,
        event_rng: StdRng,
    ) -> Result<Self> {
        models.validate()?;
        Ok(Self {
            models,
            sampler: EventSampler::default(),
            state,
            sink,
            transition_rng,
            event_rng,
            steps: DEFAULT_STEPS,
            history: Vec::with_capacity(DEFAULT_STEPS),
        })
    }

    /// Задать число шагов
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Задать ограничения на события
    pub fn with_limits(mut self, limits: ClampLimits) -> Self {
        self.sampler = EventSampler::new(limits);
        self
    }

    /// Выполнить один шаг
    pub async fn step(&mut self) -> Result<StepRecord> {
        let class = self.state.current_state();
        let models = self.models.get(class);
        let event = self.sampler.sample_event(
            class,
            &models.size,
            &models.duration,
            &mut self.event_rng,
        )?;

        self.state.timers.add(class, event.duration)?;
        self.sink.transmit(class, event.size).await?;

        let pause = Duration::try_from_secs_f64(event.duration).map_err(|e| {
            SimError::InvalidSample {
                class,
                reason: format!("интервал {}: {}", event.duration, e),
            }
        })?;
        sleep(pause).await;

        let next = self.state.chain.advance(&mut self.transition_rng);
        let record = StepRecord {
            step: self.state.steps_done,
            class,
            next,
            size: event.size,
            duration: event.duration,
        };
        self.state.steps_done += 1;

        info!(
            "Шаг {}: текущее состояние {}, переход в {} (размер {}, интервал {:.6} с)",
            record.step, record.class, record.next, record.size, record.duration
        );
        self.history.push(record);
        Ok(record)
    }

    /// Выполнить все шаги и посчитать доли удержания
    pub async fn run(&mut self) -> Result<RetentionReport> {
        info!(
            "Симуляция: {} шагов, старт в {}",
            self.steps,
            self.state.current_state()
        );
        for _ in 0..self.steps {
            self.step().await?;
        }

        let report = self.state.timers.report()?;
        for class in TrafficClass::ALL {
            info!(
                "Удержание {}: {} ({:.3} с)",
                class,
                report.fraction(class),
                report.elapsed(class)
            );
        }
        Ok(report)
    }

    /// Состояние симуляции
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Записи о выполненных шагах
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Получатель пакетов
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Забрать получатель пакетов
    pub fn into_sink(self) -> S {
        self.sink
    }
}
