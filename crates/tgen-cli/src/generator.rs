//! Сборка генератора по конфигурации
//!
//! Подбор моделей по трассам, выбор способа передачи и запуск симуляции.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use tgen_sim::{
    fit_models, DryRunSink, MarkovChain, ModelSet, PacketSink, RetentionReport, Simulation,
    SimulationState, TextTrace, TransportMode, UdpSink,
};

use crate::config::GeneratorConfig;

/// Генератор трафика
pub struct TrafficGenerator {
    config: GeneratorConfig,
}

impl TrafficGenerator {
    /// Создать генератор
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Конфигурация
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Подобрать шесть моделей по трассам
    pub fn fit_models(&self) -> anyhow::Result<ModelSet> {
        let traces = &self.config.traces;
        let models = fit_models(
            &TextTrace::new(&traces.video, traces.max_records),
            &TextTrace::new(&traces.radio, traces.max_records),
            &TextTrace::new(&traces.game, traces.max_records),
            &self.config.catalog(),
        )?;
        Ok(models)
    }

    /// Открыть получатель пакетов согласно режиму передачи
    pub async fn open_sink(&self) -> anyhow::Result<Box<dyn PacketSink>> {
        match self.config.transmission.mode {
            TransportMode::Udp => {
                let sink = UdpSink::bind(self.config.destination_address()).await?;
                Ok(Box::new(sink))
            }
            TransportMode::DryRun => {
                info!("Режим dry_run: пакеты не отправляются");
                Ok(Box::new(DryRunSink::new()))
            }
            TransportMode::RawIp => anyhow::bail!("Режим raw_ip не поддерживается"),
        }
    }

    /// Запустить симуляцию с готовыми моделями
    pub async fn run(&self, models: ModelSet) -> anyhow::Result<RetentionReport> {
        let sink = self.open_sink().await?;
        self.run_with_sink(models, sink).await
    }

    /// Запустить симуляцию с заданным получателем пакетов
    pub async fn run_with_sink<S: PacketSink>(
        &self,
        models: ModelSet,
        sink: S,
    ) -> anyhow::Result<RetentionReport> {
        let mut master = match self.config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let transition_rng = StdRng::from_rng(&mut master)?;
        let event_rng = StdRng::from_rng(&mut master)?;

        let table = self.config.transition_table();
        let chain = match self.config.chain.start {
            Some(start) => MarkovChain::new(table, start)?,
            None => MarkovChain::with_random_start(table, &mut master)?,
        };

        let mut simulation = Simulation::new(
            models,
            SimulationState::new(chain),
            sink,
            transition_rng,
            event_rng,
        )?
        .with_steps(self.config.simulation.steps)
        .with_limits(self.config.clamp_limits());

        Ok(simulation.run().await?)
    }
}

/// Сохранить модели в JSON
pub fn save_models<P: AsRef<Path>>(path: P, models: &ModelSet) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(models)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Загрузить модели из JSON
pub fn load_models<P: AsRef<Path>>(path: P) -> anyhow::Result<ModelSet> {
    let content = std::fs::read_to_string(path)?;
    let models: ModelSet = serde_json::from_str(&content)?;
    models.validate()?;
    Ok(models)
}
