pub mod assessment;
pub mod capture;
pub mod content;
pub mod db;
pub mod models;
pub mod parts;
pub mod replay;
pub mod scoring;
pub mod settings;
pub mod sink;
pub mod timer;
pub mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use tokio::{sync::mpsc, time::Instant};

use assessment::{AssessmentController, AssessmentObserver, AssessmentOutcome};
use content::ContentLibrary;
use db::Database;
use replay::{replay, replay_paced, OperatorScript};
use settings::SettingsStore;
use sink::spawn_sink_dispatcher;
use timer::Ticker;

const ENABLE_LOGS: bool = true;

/// What a single command-line run should do.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub content: PathBuf,
    pub script: PathBuf,
    pub data_dir: PathBuf,
    /// Wait out the script's timings instead of replaying instantly.
    pub paced: bool,
    /// Print this many stored attempts after the run.
    pub history: usize,
}

/// Prints the result screen as JSON.
struct ConsoleObserver;

impl AssessmentObserver for ConsoleObserver {
    fn on_complete(&self, outcome: &AssessmentOutcome) {
        match serde_json::to_string_pretty(outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => log_error!("Failed to render assessment outcome: {err}"),
        }
    }

    fn on_cancel(&self) {
        println!("Assessment cancelled.");
    }
}

pub async fn run(options: RunOptions) -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log_info!("Fluency engine starting up...");

    std::fs::create_dir_all(&options.data_dir).with_context(|| {
        format!("failed to create data directory {}", options.data_dir.display())
    })?;
    let settings = SettingsStore::new(options.data_dir.join("settings.json"))?;
    let database = Database::new(settings.database_path())?;
    let content = Arc::new(ContentLibrary::load(&options.content)?);
    let script = OperatorScript::load(&options.script)?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let dispatcher = spawn_sink_dispatcher(events_rx, Arc::new(database.clone()));

    let mut controller =
        AssessmentController::new(content, settings.policy(), settings.device_id())
            .with_events(events_tx)
            .with_observer(Arc::new(ConsoleObserver));

    let report = if options.paced {
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::every_second();
        ticker.start(tick_tx)?;
        let heartbeat = tokio::spawn(async move {
            while let Some(tick) = tick_rx.recv().await {
                log_debug!("{}s elapsed", tick.count);
            }
        });

        let report = replay_paced(&mut controller, &script).await;
        ticker.stop().await?;
        heartbeat.await.context("heartbeat task failed to join")?;
        report?
    } else {
        replay(&mut controller, &script, Instant::now())?
    };

    if !report.rejected.is_empty() {
        log_warn!(
            "{} of {} scripted actions were rejected",
            report.rejected.len(),
            report.applied + report.rejected.len()
        );
    }

    // Closing the event channel lets the dispatcher drain and exit.
    drop(controller);
    if let Err(err) = dispatcher.await {
        log_error!("Sink dispatcher failed: {err}");
    }

    if options.history > 0 {
        for attempt in database.list_recent_attempts(options.history).await? {
            println!(
                "{}  {}  {}  band={}  placement={} ({})",
                attempt.completed_at.to_rfc3339(),
                attempt.id,
                attempt.learner_group.as_str(),
                attempt.result_band.map_or("-", |band| band.as_str()),
                attempt.placement_level.as_str(),
                attempt.placement_confidence.as_str()
            );
        }
    }

    Ok(())
}
