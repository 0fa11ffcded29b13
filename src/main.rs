//! duebell - deadline and class-slot reminders.
//!
//! Usage:
//!   duebell run                 Run the reminder loop until Ctrl-C
//!   duebell check [--at TIME]   Print what is due at an instant (--json for JSON)
//!   duebell validate <FILE>     Validate a configuration file

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use duebell::config::{
    ConfigLoader, DuebellConfig, NotifierConfig, SqliteLayoutConfig, StorageConfig,
};
use duebell::{
    CommandNotifier, Event, EventBus, EventHandler, InMemoryStore, NoopNotifier,
    NotificationDispatcher, NotifierBackend, OsNotifier, ReminderScheduler, Store, due_reminders,
    parse_deadline,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// duebell - deadline and class-slot reminders
#[derive(Parser)]
#[command(name = "duebell")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to duebell.yaml (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder loop until interrupted
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Seconds between ticks (1-30)
        #[arg(long)]
        tick_interval: Option<u64>,

        /// Application name shown in desktop notifications
        #[arg(long)]
        app_name: Option<String>,

        /// Publish on the event bus only, without desktop notifications
        #[arg(long)]
        no_desktop: bool,
    },

    /// Print the reminders due at an instant without sending them
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Instant to evaluate, in any accepted deadline layout (default: now)
        #[arg(long, value_name = "TIME")]
        at: Option<String>,

        /// Print the reminders as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file without running
    Validate {
        /// Path to the configuration file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Storage overrides shared by `run` and `check`.
#[derive(clap::Args)]
struct SourceArgs {
    /// Read tasks and class slots from this SQLite database
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Table naming of the database given with --db
    #[arg(long, value_enum, default_value_t = LayoutArg::Standard)]
    layout: LayoutArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Standard,
    Indonesian,
}

impl From<LayoutArg> for SqliteLayoutConfig {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Standard => SqliteLayoutConfig::Standard,
            LayoutArg::Indonesian => SqliteLayoutConfig::Indonesian,
        }
    }
}

/// Logs bus events.
struct LoggingHandler;

#[async_trait::async_trait]
impl EventHandler for LoggingHandler {
    async fn handle(&self, event: &Event) {
        match event {
            Event::Reminder { payload, .. } => {
                info!(title = %payload.title, "{}", payload.message);
            }
            Event::SchedulerStarted { tick_interval, .. } => {
                info!("Checking reminders every {:?}", tick_interval);
            }
            Event::SchedulerStopped { ticks, .. } => {
                info!("Stopped after {} ticks", ticks);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            source,
            tick_interval,
            app_name,
            no_desktop,
        } => {
            let mut config = load_config(cli.config.as_ref())?;
            apply_source(&mut config, &source);
            if let Some(secs) = tick_interval {
                config.tick_interval_secs = secs;
            }
            if let Some(name) = app_name {
                config.app_name = name;
            }
            if no_desktop {
                config.notifier = NotifierConfig::None;
            }
            ConfigLoader::validate(&config)?;
            run_scheduler(config).await?;
        }
        Commands::Check { source, at, json } => {
            let mut config = load_config(cli.config.as_ref())?;
            apply_source(&mut config, &source);
            ConfigLoader::validate(&config)?;
            check_due(config, at, json).await?;
        }
        Commands::Validate { file } => {
            validate_config(file)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<DuebellConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ConfigLoader::load(path)?),
        None => Ok(DuebellConfig::default()),
    }
}

fn apply_source(config: &mut DuebellConfig, source: &SourceArgs) {
    if let Some(db) = &source.db {
        config.storage = StorageConfig::Sqlite {
            path: db.display().to_string(),
            layout: source.layout.into(),
        };
        config.seed = Default::default();
    }
}

async fn open_store(config: &DuebellConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    match &config.storage {
        StorageConfig::Memory => {
            let store = InMemoryStore::new();
            for task in &config.seed.tasks {
                store.insert_task(task.clone())?;
            }
            for slot in &config.seed.class_slots {
                store.insert_slot(slot.clone())?;
            }
            info!(
                tasks = config.seed.tasks.len(),
                slots = config.seed.class_slots.len(),
                "Using in-memory store"
            );
            Ok(Arc::new(store))
        }
        #[cfg(feature = "sqlite")]
        StorageConfig::Sqlite { path, layout } => {
            let layout = match layout {
                SqliteLayoutConfig::Standard => duebell::SqliteLayout::STANDARD,
                SqliteLayoutConfig::Indonesian => duebell::SqliteLayout::INDONESIAN,
            };
            let store = duebell::SqliteStore::new(path, layout).await?;
            info!(path = %path, "Using SQLite store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageConfig::Sqlite { .. } => {
            Err("SQLite support is not compiled in (enable the `sqlite` feature)".into())
        }
    }
}

fn build_notifier(config: &DuebellConfig) -> Arc<dyn OsNotifier> {
    match &config.notifier {
        NotifierConfig::None => Arc::new(NoopNotifier),
        NotifierConfig::Command {
            timeout_secs,
            program,
            args,
        } => {
            let notifier = match program {
                Some(program) => CommandNotifier::new(
                    NotifierBackend::Custom {
                        program: program.clone(),
                        args: args.clone(),
                    },
                    config.app_name.clone(),
                ),
                None => match CommandNotifier::for_platform(config.app_name.clone()) {
                    Ok(notifier) => notifier,
                    Err(e) => {
                        warn!("Desktop notifications disabled: {}", e);
                        return Arc::new(NoopNotifier);
                    }
                },
            };
            Arc::new(notifier.with_timeout(Duration::from_secs(*timeout_secs)))
        }
    }
}

async fn run_scheduler(config: DuebellConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config).await?;
    let notifier = build_notifier(&config);
    info!(notifier = notifier.name(), "Desktop notifier ready");

    let event_bus = Arc::new(EventBus::new());
    event_bus.register(Arc::new(LoggingHandler)).await;

    let scheduler = ReminderScheduler::with_store(store)
        .with_dispatcher(NotificationDispatcher::new(event_bus, notifier))
        .with_tick_interval(config.tick_interval())?;

    let cancel = CancellationToken::new();
    let (handle, task) = scheduler.start(cancel).await;

    info!("Press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.shutdown();
    if let Err(e) = task.await {
        warn!("Scheduler task ended abnormally: {}", e);
    }

    Ok(())
}

async fn check_due(
    config: DuebellConfig,
    at: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let now: DateTime<Local> = match at {
        Some(text) => parse_deadline(&text, &Local)?,
        None => Local::now(),
    };

    let store = open_store(&config).await?;
    let due = due_reminders(store.as_ref(), &now).await?;

    if json {
        let entries: Vec<serde_json::Value> = due
            .iter()
            .map(|reminder| {
                serde_json::json!({
                    "entity": reminder.entity.to_string(),
                    "title": reminder.notification.title,
                    "message": reminder.notification.message,
                })
            })
            .collect();
        let output = serde_json::json!({
            "at": now.to_rfc3339(),
            "due": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Due at {}:", now.format("%Y-%m-%d %H:%M:%S"));
    if due.is_empty() {
        println!("  (nothing)");
        return Ok(());
    }
    for reminder in due {
        println!(
            "  {:<10} {} {}",
            reminder.entity.to_string(),
            reminder.notification.title,
            reminder.notification.message
        );
    }

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load(&file)?;

    println!("Configuration '{}' is valid", file.display());
    println!("  Tick interval: {}s", config.tick_interval_secs);
    println!("  App name: {}", config.app_name);
    match &config.storage {
        StorageConfig::Memory => println!(
            "  Storage: memory ({} tasks, {} class slots)",
            config.seed.tasks.len(),
            config.seed.class_slots.len()
        ),
        StorageConfig::Sqlite { path, layout } => {
            println!("  Storage: sqlite {} ({:?} layout)", path, layout)
        }
    }
    match &config.notifier {
        NotifierConfig::Command { program, .. } => println!(
            "  Notifier: {}",
            program.as_deref().unwrap_or("platform default")
        ),
        NotifierConfig::None => println!("  Notifier: none"),
    }

    Ok(())
}
