//! Live reload hub.
//!
//! A single task owns the [`SessionRegistry`] and processes connects,
//! disconnects and change events strictly in arrival order. A session that
//! connects while a broadcast is queued ahead of it only sees later
//! broadcasts.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use yakety_watch::ChangeEvent;

use super::dispatcher::{BroadcastDispatcher, DispatchReport};
use super::registry::{Session, SessionId, SessionRegistry, Transport};

enum Command {
    Register(Session),
    Unregister(SessionId),
    Change {
        event: ChangeEvent,
        report: Option<oneshot::Sender<DispatchReport>>,
    },
    #[cfg(test)]
    Count(oneshot::Sender<usize>),
}

/// Cloneable handle to the hub task.
///
/// The task stops once every handle is dropped.
#[derive(Clone, Debug)]
pub(crate) struct HubHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl HubHandle {
    /// Spawn the hub task on the current Tokio runtime.
    pub(crate) fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_hub(rx));
        Self { tx }
    }

    /// Register a new session for `transport` and return its identifier.
    pub(crate) fn register(&self, transport: Arc<dyn Transport>) -> SessionId {
        let id = SessionId::new();
        self.submit(Command::Register(Session::new(id, transport)));
        id
    }

    /// Remove a session. Unknown identifiers are ignored.
    pub(crate) fn unregister(&self, id: SessionId) {
        self.submit(Command::Unregister(id));
    }

    /// Queue a broadcast and wait for its report.
    pub(crate) async fn broadcast(&self, event: ChangeEvent) -> DispatchReport {
        let (tx, rx) = oneshot::channel();
        self.submit(Command::Change {
            event,
            report: Some(tx),
        });
        rx.await.unwrap_or_default()
    }

    /// Number of live sessions once every previously queued command has run.
    #[cfg(test)]
    pub(crate) async fn session_count(&self) -> usize {
        let (tx, rx) = oneshot::channel();
        self.submit(Command::Count(tx));
        rx.await.unwrap_or(0)
    }

    fn submit(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::debug!("Live reload hub stopped, dropping command");
        }
    }
}

async fn run_hub(mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut registry = SessionRegistry::default();
    let mut dispatcher = BroadcastDispatcher::default();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Register(session) => registry.register(session),
            Command::Unregister(id) => {
                registry.unregister(id);
            }
            Command::Change { event, report } => {
                let result = dispatcher.on_change(&mut registry, &event);
                if let Some(report) = report {
                    let _ = report.send(result);
                }
            }
            #[cfg(test)]
            Command::Count(reply) => {
                let _ = reply.send(registry.len());
            }
        }
    }

    tracing::debug!("Live reload hub stopped");
}
