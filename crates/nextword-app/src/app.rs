// Application state and orchestration logic.
//
// The central event loop owns the `PredictionController`. It receives user
// commands from the UI, runs network calls on spawned tasks that report back
// over the prediction event channel, and pushes a fresh snapshot to the UI
// after every state change.
//
// The loop never waits on the UI channel. Every snapshot is a full state, so
// when the channel is full only a "snapshot pending" flag is kept and the
// latest state goes out once the UI drains. A burst of keystrokes therefore
// cannot stall command processing while the UI is itself blocked sending.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use nextword_client::{PredictError, PredictionService};
use nextword_core::protocol::{Candidate, ServiceStatus, UiUpdate, UserCommand};

use crate::controller::{PendingRequest, PredictionController, RequestOutcome};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Results coming back from spawned network tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    /// A prediction request finished.
    Predictions {
        generation: u64,
        outcome: Result<Vec<Candidate>, PredictError>,
    },
    /// A health check finished.
    Health(Result<String, PredictError>),
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub controller: PredictionController,
    /// Shared with spawned request tasks.
    pub service: Arc<dyn PredictionService>,
    /// Spawned tasks send their outcome through a clone of this sender.
    pub service_tx: mpsc::Sender<ServiceEvent>,
    pub current_request: Option<tokio::task::JoinHandle<()>>,
    pub service_status: ServiceStatus,
    /// A snapshot newer than anything the UI has received is waiting.
    snapshot_pending: bool,
    /// `service_status` changed and the UI has not been told yet.
    status_pending: bool,
}

impl AppState {
    pub fn new(
        controller: PredictionController,
        service: Arc<dyn PredictionService>,
        service_tx: mpsc::Sender<ServiceEvent>,
    ) -> Self {
        AppState {
            controller,
            service,
            service_tx,
            current_request: None,
            service_status: ServiceStatus::Unknown,
            snapshot_pending: false,
            status_pending: false,
        }
    }

    /// Whether some UI update is queued for delivery.
    pub fn has_pending_ui(&self) -> bool {
        self.snapshot_pending || self.status_pending
    }

    /// Take the next queued UI update, built from the current state.
    fn take_pending_update(&mut self) -> Option<UiUpdate> {
        if self.status_pending {
            self.status_pending = false;
            return Some(UiUpdate::ServiceStatus(self.service_status));
        }
        if self.snapshot_pending {
            self.snapshot_pending = false;
            return Some(UiUpdate::Snapshot(Box::new(self.controller.snapshot())));
        }
        None
    }

    fn discard_pending_ui(&mut self) {
        self.snapshot_pending = false;
        self.status_pending = false;
    }

    /// Act on the outcome of a request attempt: spawn the network call when
    /// one was started. Returns `true` if the controller state changed.
    pub fn dispatch(&mut self, outcome: RequestOutcome) -> bool {
        match outcome {
            RequestOutcome::Started(pending) => {
                self.spawn_request(pending);
                true
            }
            RequestOutcome::Skipped => true,
            RequestOutcome::Busy => {
                info!("Ignoring request while another is in flight");
                false
            }
        }
    }

    fn spawn_request(&mut self, pending: PendingRequest) {
        let service = Arc::clone(&self.service);
        let tx = self.service_tx.clone();
        let PendingRequest {
            generation,
            request,
        } = pending;

        let handle = tokio::spawn(async move {
            let outcome = service.predict(&request).await;
            if tx
                .send(ServiceEvent::Predictions {
                    generation,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!("App loop gone, dropping prediction result (gen: {generation})");
            }
        });

        // The previous task, if any, was abandoned by a clear; its result
        // will be discarded as stale.
        self.current_request = Some(handle);
    }

    /// Probe the service root on a spawned task.
    pub fn spawn_health_check(&self) {
        let service = Arc::clone(&self.service);
        let tx = self.service_tx.clone();
        tokio::spawn(async move {
            let outcome = service.health_check().await;
            if tx.send(ServiceEvent::Health(outcome)).await.is_err() {
                debug!("App loop gone, dropping health check result");
            }
        });
    }

    /// Abort an in-flight request task on shutdown.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.current_request.take() {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the application event loop until `Quit` or the command channel
/// closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut service_rx: mpsc::Receiver<ServiceEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.controller.snapshot())))
        .await
        .context("UI channel closed before the first snapshot")?;
    state.spawn_health_check();

    // AppState holds a sender, so this channel only closes if the state is
    // torn down; keep the guard anyway so select! never spins on it.
    let mut service_open = true;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx),
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = service_rx.recv(), if service_open => {
                match event {
                    Some(event) => handle_service_event(&mut state, event, &ui_tx),
                    None => {
                        info!("Service channel closed");
                        service_open = false;
                    }
                }
            }

            // Deliver updates that did not fit earlier, as soon as there is room.
            permit = ui_tx.reserve(), if state.has_pending_ui() => {
                match permit {
                    Ok(permit) => {
                        if let Some(update) = state.take_pending_update() {
                            permit.send(update);
                        }
                    }
                    Err(_) => {
                        debug!("UI channel closed, dropping pending updates");
                        state.discard_pending_ui();
                    }
                }
            }
        }
    }

    state.shutdown();
    info!("Application event loop exiting");
    Ok(())
}

/// Handle a user command from the UI.
fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let changed = match cmd {
        UserCommand::SetText(text) => state.controller.set_text(text),
        UserCommand::SetTopK(top_k) => state.controller.set_top_k(top_k),
        UserCommand::SetTemperature(temperature) => {
            state.controller.set_temperature(temperature)
        }
        UserCommand::Submit => {
            let outcome = state.controller.submit();
            state.dispatch(outcome)
        }
        UserCommand::ApplySuggestion { token } => {
            debug!(token = %token, "Applying suggestion");
            let outcome = state.controller.apply_suggestion(&token);
            state.dispatch(outcome)
        }
        UserCommand::Clear => state.controller.clear(),
        UserCommand::CheckService => {
            state.spawn_health_check();
            false
        }
        UserCommand::Quit => false, // handled in the main loop
    };

    if changed {
        push_snapshot(state, ui_tx);
    }
}

/// Handle a finished network task.
fn handle_service_event(
    state: &mut AppState,
    event: ServiceEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        ServiceEvent::Predictions {
            generation,
            outcome,
        } => {
            if state.controller.resolve(generation, outcome) {
                state.current_request = None;
                push_snapshot(state, ui_tx);
            }
        }
        ServiceEvent::Health(outcome) => {
            let status = match outcome {
                Ok(reported) => {
                    info!("Prediction service online: {reported}");
                    ServiceStatus::Online
                }
                Err(err) => {
                    warn!("Prediction service unreachable: {err}");
                    ServiceStatus::Offline
                }
            };
            if status != state.service_status {
                state.service_status = status;
                state.status_pending = true;
                flush_ui(state, ui_tx);
            }
        }
    }
}

fn push_snapshot(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    state.snapshot_pending = true;
    flush_ui(state, ui_tx);
}

/// Send queued updates while the channel has room. Whatever does not fit
/// stays queued for the loop's `reserve` branch.
fn flush_ui(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    while state.has_pending_ui() {
        match ui_tx.try_reserve() {
            Ok(permit) => {
                if let Some(update) = state.take_pending_update() {
                    permit.send(update);
                }
            }
            Err(TrySendError::Full(())) => break,
            Err(TrySendError::Closed(())) => {
                debug!("UI channel closed, dropping pending updates");
                state.discard_pending_ui();
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
