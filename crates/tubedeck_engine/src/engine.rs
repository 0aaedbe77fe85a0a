use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use deck_logging::{deck_debug, deck_error, deck_info};
use tokio::sync::mpsc as lane;

use crate::registry::Registry;
use crate::{AddRequest, Collection, CommandKind, EngineEvent};

/// Work on the import lane. Only one is ever in flight.
enum ImportCommand {
    Submit { run_id: u64, request: AddRequest },
    Wait { run_id: u64, delay: Duration },
}

enum EngineCommand {
    Add { request: AddRequest },
    Delete { collection: Collection, ids: Vec<String> },
    Start { ids: Vec<String> },
    Refresh,
    Shutdown,
}

/// Handle to the background engine thread.
///
/// Import submissions and delays are executed strictly one after another on a
/// dedicated lane; every other command runs concurrently.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    import_tx: lane::UnboundedSender<ImportCommand>,
}

/// Receiving side of the engine's event stream.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl EngineHandle {
    pub fn new(registry: Arc<dyn Registry>) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (import_tx, import_rx) = lane::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    deck_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            runtime.spawn(run_import_lane(
                registry.clone(),
                import_rx,
                event_tx.clone(),
            ));
            while let Ok(command) = cmd_rx.recv() {
                if matches!(command, EngineCommand::Shutdown) {
                    break;
                }
                let registry = registry.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(registry.as_ref(), command, event_tx).await;
                });
            }
            deck_info!("Engine stopped");
        });

        (Self { cmd_tx, import_tx }, EngineEvents { event_rx })
    }

    pub fn submit_import(&self, run_id: u64, request: AddRequest) {
        let _ = self.import_tx.send(ImportCommand::Submit { run_id, request });
    }

    pub fn schedule_import_step(&self, run_id: u64, delay: Duration) {
        let _ = self.import_tx.send(ImportCommand::Wait { run_id, delay });
    }

    pub fn add(&self, request: AddRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Add { request });
    }

    pub fn delete(&self, collection: Collection, ids: Vec<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Delete { collection, ids });
    }

    pub fn start(&self, ids: Vec<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Start { ids });
    }

    /// Re-reads the registry collections; answered with `EngineEvent::HistoryLoaded`.
    pub fn refresh(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Refresh);
    }

    /// Stops the engine thread. Outstanding work is dropped.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

async fn run_import_lane(
    registry: Arc<dyn Registry>,
    mut commands: lane::UnboundedReceiver<ImportCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    while let Some(command) = commands.recv().await {
        let event = match command {
            ImportCommand::Submit { run_id, request } => {
                deck_debug!("Import run {} submitting {}", run_id, request.url);
                let result = registry.add(&request).await;
                EngineEvent::ImportSubmitted {
                    run_id,
                    url: request.url,
                    result,
                }
            }
            ImportCommand::Wait { run_id, delay } => {
                tokio::time::sleep(delay).await;
                EngineEvent::ImportDelayElapsed { run_id }
            }
        };
        if event_tx.send(event).is_err() {
            break;
        }
    }
}

async fn handle_command(
    registry: &dyn Registry,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Add { request } => {
            let result = registry.add(&request).await;
            EngineEvent::AddFinished {
                url: request.url,
                result,
            }
        }
        EngineCommand::Delete { collection, ids } => EngineEvent::CommandFinished {
            kind: CommandKind::Delete,
            result: registry.delete_by_id(collection, &ids).await,
        },
        EngineCommand::Start { ids } => EngineEvent::CommandFinished {
            kind: CommandKind::Start,
            result: registry.start_by_id(&ids).await,
        },
        EngineCommand::Refresh => EngineEvent::HistoryLoaded(registry.history().await),
        EngineCommand::Shutdown => return,
    };
    let _ = event_tx.send(event);
}
