//! Демонстрационный CLI для msgbus.
//!
//! Загружает настройки, поднимает логирование и прогоняет сценарий
//! Ping/Pong либо нагрузочную рассылку через `MessageBus`.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use msgbus::{
    error::{LogLevel, MsgbusResult, ResultExt},
    init_logging, DispatchPolicy, LogFormat, MessageBus, Receiver, Settings, StackError,
};
use tracing::{debug, error, info, warn};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser)]
#[command(name = "msgbus")]
#[command(version = env!("CARGO_PKG_VERSION"), long_version = LONG_VERSION)]
#[command(about = "msgbus - typed in-process message bus demo", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Файл настроек (TOML, JSON, YAML)
    #[arg(short, long, env = "MSGBUS_CONFIG", help = "Путь к файлу настроек")]
    config: Option<PathBuf>,
    /// Политика доставки при панике обработчика
    #[arg(long, help = "fail_fast или collect_all")]
    policy: Option<DispatchPolicy>,
    /// Уровень логирования
    #[arg(long, help = "trace, debug, info, warn, error или off")]
    log_level: Option<String>,
    /// Формат логов
    #[arg(long, help = "json, pretty или compact")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Сценарий Ping/Pong с глобальными и адресными подписками
    Demo,
    /// Рассылка N сообщений на M подписчиков с замером времени
    Fanout {
        #[arg(long, default_value = "8")]
        handlers: usize,
        #[arg(long, default_value = "100000")]
        messages: usize,
    },
}

#[derive(Debug, Clone)]
struct Ping;

#[derive(Debug, Clone)]
struct Pong;

#[derive(Debug, Clone)]
struct Tick;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load_from(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(policy) = cli.policy {
        settings.bus.dispatch_policy = policy;
    }
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }

    init_logging(settings.logging.clone()).context("Failed to initialize logging")?;

    let bus = MessageBus::from_settings(&settings);
    let outcome = match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => run_demo(&bus),
        Commands::Fanout { handlers, messages } => run_fanout(&bus, handlers, messages),
    };
    if let Err(err) = &outcome {
        report(err);
    }
    Ok(outcome?)
}

/// Пишет ошибку в лог с уровнем, соответствующим её статус-коду.
fn report(err: &StackError) {
    let code = err.status_code();
    match err.log_level() {
        LogLevel::Error => error!(%code, error = %err, "Scenario failed"),
        LogLevel::Warn => warn!(%code, error = %err, "Scenario failed"),
        _ => debug!(%code, error = %err, "Scenario failed"),
    }
}

fn run_demo(bus: &MessageBus) -> MsgbusResult<()> {
    let r1 = Receiver::named("r1");

    bus.register_global(|_: &Ping| println!("A <- Ping (global)"));
    bus.register(&r1, |_: &Ping| println!("B <- Ping (r1)"));
    bus.register_global(|_: &Pong| println!("C <- Pong (global)"));

    let delivered = bus.send(Ping).context("first Ping")?;
    println!("Ping delivered to {delivered} handler(s)");

    let removed = bus.unregister_type_for::<Ping>(&r1);
    println!("Removed {removed} Ping subscription(s) of r1");

    let delivered = bus.send(Ping).context("second Ping")?;
    println!("Ping delivered to {delivered} handler(s)");

    let delivered = bus.send(Pong).context("Pong")?;
    println!("Pong delivered to {delivered} handler(s)");

    info!(stats = ?bus.stats(), "Demo finished");
    Ok(())
}

fn run_fanout(
    bus: &MessageBus,
    handlers: usize,
    messages: usize,
) -> MsgbusResult<()> {
    let received = Arc::new(AtomicUsize::new(0));
    for i in 0..handlers {
        let received = received.clone();
        bus.register(Receiver::named(format!("worker-{i}")), move |_: &Tick| {
            received.fetch_add(1, Ordering::Relaxed);
        });
    }

    let start = Instant::now();
    for n in 0..messages {
        bus.send(Tick)
            .with_context(|| format!("fan-out message {n}"))?;
    }
    let elapsed = start.elapsed();

    println!(
        "{messages} message(s) x {handlers} handler(s): {} deliveries in {:.2?}",
        received.load(Ordering::Relaxed),
        elapsed
    );
    info!(stats = ?bus.stats(), elapsed_ms = elapsed.as_millis() as u64, "Fanout finished");
    Ok(())
}
