// nextword entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the prediction client
// 4. Create mpsc channels
// 5. Spawn app logic task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use nextword_app::app::{self, AppState};
use nextword_app::controller::PredictionController;
use nextword_client::HttpPredictionClient;
use nextword_core::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    let log_path = init_tracing()?;
    info!("nextword starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: service={}, top_k={}, temperature={}",
        config.service.base_url, config.sampling.top_k, config.sampling.temperature
    );

    // 3. Build the prediction client
    let client =
        HttpPredictionClient::from_config(&config).context("failed to build HTTP client")?;
    info!("Prediction endpoint: {}", client.predict_url());

    // 4. Create mpsc channels
    let (service_tx, service_rx) = mpsc::channel(16);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = AppState::new(
        PredictionController::from_config(&config),
        Arc::new(client),
        service_tx,
    );

    // 5. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, service_rx, ui_tx, app_state).await {
            error!("Application loop error: {:#}", e);
        }
    });

    // 6. Run the TUI (blocks until the user quits)
    info!("Application ready, logging to {}", log_path.display());
    let tui_result = nextword_tui::run(ui_rx, cmd_tx).await;
    if let Err(e) = &tui_result {
        error!("TUI error: {:#}", e);
    }

    // 7. Cleanup: the TUI dropped cmd_tx, so the app loop winds down
    if tokio::time::timeout(Duration::from_secs(5), app_handle)
        .await
        .is_err()
    {
        error!("Application loop did not stop in time");
    }

    info!("nextword shut down cleanly");
    tui_result
}

/// Initialize tracing to a log file (the terminal belongs to the TUI).
/// Returns the log file path.
fn init_tracing() -> anyhow::Result<PathBuf> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join("nextword.log");
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nextword=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(log_path)
}

/// Per-user data directory for logs, or `./logs` when the platform has none.
fn log_dir() -> anyhow::Result<PathBuf> {
    match directories::ProjectDirs::from("", "", "nextword") {
        Some(dirs) => Ok(dirs.data_local_dir().join("logs")),
        None => Ok(std::env::current_dir()?.join("logs")),
    }
}
