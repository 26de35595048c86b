//! TGen CLI
//!
//! Подбор распределений по трассам и симуляция синтетического трафика.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tgen_cli::{load_models, save_models, GeneratorConfig, TrafficGenerator};
use tgen_core::Metric;
use tgen_sim::{ModelSet, TrafficClass};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Аргументы командной строки
#[derive(Parser, Debug)]
#[command(name = "tgen")]
#[command(about = "Synthetic traffic generator", long_about = None)]
struct Args {
    /// Путь к конфигурационному файлу
    #[arg(short, long, default_value = "tgen.toml")]
    config: PathBuf,

    /// Уровень логирования (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Подкоманды
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Подобрать модели по трассам без симуляции
    Fit {
        /// Сохранить модели в JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Подобрать модели и запустить симуляцию
    Run {
        /// Взять готовые модели из JSON вместо подбора
        #[arg(short, long)]
        models: Option<PathBuf>,
    },

    /// Генерация примера конфигурации
    GenerateConfig {
        /// Путь для сохранения
        #[arg(short, long, default_value = "tgen.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let command = match args.command {
        Some(Commands::GenerateConfig { output }) => {
            if let Err(e) = generate_config(&output) {
                eprintln!("Ошибка генерации конфигурации: {}", e);
                std::process::exit(1);
            }
            println!("Конфигурация сохранена в: {}", output.display());
            return;
        }
        Some(command) => command,
        None => Commands::Run { models: None },
    };

    // Загрузка конфигурации
    let config = match GeneratorConfig::from_file(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            if !args.config.exists() {
                println!("⚠ Конфигурационный файл не найден: {}", args.config.display());
                println!("📝 Создание конфигурации по умолчанию...");

                if let Err(gen_err) = generate_config(&args.config) {
                    eprintln!("Ошибка создания конфигурации: {}", gen_err);
                    std::process::exit(1);
                }

                println!("✓ Конфигурация создана: {}", args.config.display());
                println!();
                println!("📋 Необходимые действия:");
                println!("  1. Укажите пути к трассам video, radio и game в секции [traces]");
                println!("  2. Выберите режим передачи (udp или dry_run) в секции [transmission]");
                println!("  3. Запустите генератор снова: tgen");
                println!();
                std::process::exit(0);
            } else {
                eprintln!("Ошибка загрузки конфигурации: {}", e);
                eprintln!("Проверьте файл: {}", args.config.display());
                std::process::exit(1);
            }
        }
    };

    // Инициализация логирования
    let log_level = args
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Не удалось установить global subscriber: {}", e);
        std::process::exit(1);
    }

    info!("╔═══════════════════════════════════════════════════╗");
    info!("║      TGen Traffic Generator v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚═══════════════════════════════════════════════════╝");

    // Вывод конфигурации
    info!("Конфигурация:");
    info!(
        "  • Трассы: {}, {}, {}",
        config.traces.video.display(),
        config.traces.radio.display(),
        config.traces.game.display()
    );
    info!("  • Шагов: {}", config.simulation.steps);
    info!(
        "  • Передача: {} на {}",
        config.transmission.mode,
        config.destination_address()
    );

    let generator = TrafficGenerator::new(config);
    let result = match command {
        Commands::Fit { output } => fit(&generator, output.as_deref()),
        Commands::Run { models } => run(&generator, models.as_deref()).await,
        Commands::GenerateConfig { .. } => Ok(()),
    };

    if let Err(e) = result {
        error!("Критическая ошибка: {}", e);
        std::process::exit(1);
    }
}

/// Подбор моделей и их вывод
fn fit(generator: &TrafficGenerator, output: Option<&Path>) -> anyhow::Result<()> {
    let models = generator.fit_models()?;
    print_models(&models);

    if let Some(path) = output {
        save_models(path, &models)?;
        info!("Модели сохранены в {}", path.display());
    }
    Ok(())
}

/// Подбор (или загрузка) моделей и симуляция
async fn run(generator: &TrafficGenerator, models: Option<&Path>) -> anyhow::Result<()> {
    let models = match models {
        Some(path) => {
            info!("Загрузка моделей из {}", path.display());
            load_models(path)?
        }
        None => generator.fit_models()?,
    };
    print_models(&models);

    let report = generator.run(models).await?;
    println!("{}", report);
    Ok(())
}

fn print_models(models: &ModelSet) {
    for class in TrafficClass::ALL {
        let pair = models.get(class);
        println!("{} {}: {}", class, Metric::Size, pair.size);
        println!("{} {}: {}", class, Metric::Duration, pair.duration);
    }
}

/// Генерация примера конфигурации
fn generate_config(path: &Path) -> anyhow::Result<()> {
    let config = GeneratorConfig::default();
    config.to_file(path)?;
    Ok(())
}
