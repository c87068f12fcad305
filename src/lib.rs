pub mod config;
pub mod db;
pub mod hours;
pub mod models;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod utils;
pub mod votes;
pub mod weather;

use std::sync::Arc;

use anyhow::Context;
use config::AppConfig;
use db::Database;
use log::{info, warn};
use scheduler::{ResetScheduler, SchedulerConfig};
use settings::SettingsStore;
use storage::SnapshotStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use utils::{Clock, SystemClock};
use votes::{
    commands::{describe_receipt, render_status, ConsoleCommand, HELP},
    DiningController, DiningHandle,
};
use weather::{WeatherCache, WeatherStackClient};

pub struct AppState {
    pub controller: DiningController,
    pub scheduler: ResetScheduler,
}

impl AppState {
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        self.scheduler.stop().await?;
        self.controller.shutdown().await
    }
}

/// Wires storage, the state owner and the timers together.
pub async fn start(config: &AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<AppState> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir.display())
    })?;

    let settings = SettingsStore::new(config.settings_path())?;
    let weather_settings = settings.weather();

    let store = if settings.persist_snapshots() {
        let database = Database::new(config.database_path())?;
        Some(SnapshotStore::new(database))
    } else {
        info!("Snapshot persistence disabled in settings");
        None
    };

    let controller = DiningController::spawn(clock.clone(), store, weather_settings.unit);
    let mut scheduler = ResetScheduler::new(SchedulerConfig::default());
    scheduler.start(controller.handle(), clock)?;

    match &config.weather_api_key {
        Some(api_key) => {
            let client = WeatherStackClient::new(
                config.weather_base_url.clone(),
                api_key.clone(),
                weather_settings.unit,
            );
            let cache = Arc::new(WeatherCache::new(client));
            scheduler.start_weather(controller.handle(), cache, weather_settings)?;
        }
        None => warn!("WEATHERSTACK_API_KEY not set; weather stays unavailable"),
    }

    Ok(AppState {
        controller,
        scheduler,
    })
}

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    let level = if config.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Dining battle starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(async move {
        let state = start(&config, Arc::new(SystemClock)).await?;
        let result = console_loop(state.controller.handle()).await;
        state.shutdown().await?;
        result
    })
}

async fn console_loop(dining: DiningHandle) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            ConsoleCommand::Vote(campus) => {
                let receipt = dining.vote(campus).await?;
                println!("{}", describe_receipt(campus, &receipt));
            }
            ConsoleCommand::React(campus, token) => {
                let receipt = dining.react(campus, token).await?;
                println!("{}", describe_receipt(campus, &receipt));
            }
            ConsoleCommand::Crowd(campus, level) => {
                let receipt = dining.report_crowd(campus, level).await?;
                println!("{}", describe_receipt(campus, &receipt));
            }
            ConsoleCommand::Feedback {
                campus,
                text,
                is_positive,
            } => {
                let receipt = dining.feedback(campus, text, is_positive).await?;
                println!("{}", describe_receipt(campus, &receipt));
            }
            ConsoleCommand::Status => print!("{}", render_status(&dining.snapshot().await?)),
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => break,
        }
    }
    Ok(())
}
