//! Broadcast dispatcher.
//!
//! Fans one change event out to every live session, pruning the dead ones.

use std::path::Path;
use std::time::Instant;

use yakety_watch::ChangeEvent;

use super::client::RELOAD_TAG;
use super::registry::SessionRegistry;

/// Build the `reload:<path>` notification for a changed path.
pub(crate) fn reload_message(path: &Path) -> String {
    format!("{RELOAD_TAG}{}", path.display())
}

/// Outcome of one delivery round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DispatchReport {
    /// Sessions a send was attempted on.
    pub(crate) attempted: usize,
    /// Sends the transport accepted.
    pub(crate) delivered: usize,
    /// Sessions removed because their transport was closed or the send failed.
    pub(crate) pruned: usize,
}

/// Delivers reload notifications to the registry's live sessions.
#[derive(Debug, Default)]
pub(crate) struct BroadcastDispatcher {
    rounds: u64,
}

impl BroadcastDispatcher {
    /// Deliver a notification for `event` to every session live right now.
    ///
    /// Failed sessions are skipped and pruned; delivery to the remaining
    /// sessions always continues. Calling this twice with the same event
    /// runs two full rounds.
    pub(crate) fn on_change(
        &mut self,
        registry: &mut SessionRegistry,
        event: &ChangeEvent,
    ) -> DispatchReport {
        let start = Instant::now();
        self.rounds += 1;

        let message = reload_message(&event.path);
        let mut report = DispatchReport::default();
        let mut dead = Vec::new();

        registry.for_each_live(|session| {
            if !session.is_open() {
                dead.push(session.id());
                return;
            }

            report.attempted += 1;
            match session.send(&message) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::debug!(session = %session.id(), error = %e, "Failed to send live reload notification");
                    dead.push(session.id());
                }
            }
        });

        for id in &dead {
            registry.unregister(*id);
        }
        report.pruned = dead.len();

        tracing::info!(
            path = %event.path.display(),
            kind = %event.kind,
            round = self.rounds,
            clients = report.delivered,
            pruned = report.pruned,
            idle = registry.is_empty(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Live reload event processed"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use yakety_watch::ChangeKind;

    use crate::live_reload::registry::{Session, SessionId};
    use crate::live_reload::testing::RecordingTransport;

    fn register(registry: &mut SessionRegistry, transport: &Arc<RecordingTransport>) -> SessionId {
        let id = SessionId::new();
        let transport: Arc<RecordingTransport> = Arc::clone(transport);
        registry.register(Session::new(id, transport));
        id
    }

    fn app_js_modified() -> ChangeEvent {
        ChangeEvent::new("html/build/app.js", ChangeKind::Modified)
    }

    #[test]
    fn test_reload_message() {
        assert_eq!(
            reload_message(&PathBuf::from("html/build/app.js")),
            "reload:html/build/app.js"
        );
    }

    #[test]
    fn test_delivers_to_every_open_session() {
        let mut registry = SessionRegistry::default();
        let transports: Vec<_> = (0..4).map(|_| Arc::new(RecordingTransport::open())).collect();
        for t in &transports {
            register(&mut registry, t);
        }

        let report = BroadcastDispatcher::default().on_change(&mut registry, &app_js_modified());

        assert_eq!(
            report,
            DispatchReport {
                attempted: 4,
                delivered: 4,
                pruned: 0
            }
        );
        for t in &transports {
            assert_eq!(t.attempts(), 1);
            assert_eq!(t.messages(), vec!["reload:html/build/app.js".to_owned()]);
        }
    }

    #[test]
    fn test_failed_send_prunes_session_and_continues() {
        let mut registry = SessionRegistry::default();
        let healthy = Arc::new(RecordingTransport::open());
        let broken = Arc::new(RecordingTransport::broken());
        let other = Arc::new(RecordingTransport::open());
        register(&mut registry, &healthy);
        let broken_id = register(&mut registry, &broken);
        register(&mut registry, &other);

        let mut dispatcher = BroadcastDispatcher::default();
        let report = dispatcher.on_change(&mut registry, &app_js_modified());

        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.pruned, 1);
        assert_eq!(registry.len(), 2);
        assert!(!registry.unregister(broken_id));

        // Pruned session never sees another attempt
        dispatcher.on_change(&mut registry, &app_js_modified());
        assert_eq!(broken.attempts(), 1);
        assert_eq!(healthy.messages().len(), 2);
        assert_eq!(other.messages().len(), 2);
    }

    #[test]
    fn test_closed_transport_pruned_without_send() {
        let mut registry = SessionRegistry::default();
        let closed = Arc::new(RecordingTransport::open());
        register(&mut registry, &closed);
        closed.close();

        let report = BroadcastDispatcher::default().on_change(&mut registry, &app_js_modified());

        assert_eq!(report.attempted, 0);
        assert_eq!(report.pruned, 1);
        assert_eq!(closed.attempts(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_same_event_twice_runs_two_full_rounds() {
        let mut registry = SessionRegistry::default();
        let s1 = Arc::new(RecordingTransport::open());
        let s2 = Arc::new(RecordingTransport::open());
        register(&mut registry, &s1);
        register(&mut registry, &s2);

        let mut dispatcher = BroadcastDispatcher::default();
        let event = app_js_modified();
        let first = dispatcher.on_change(&mut registry, &event);
        let second = dispatcher.on_change(&mut registry, &event);

        assert_eq!(first, second);
        assert_eq!(s1.messages().len(), 2);
        assert_eq!(s2.messages().len(), 2);
    }

    #[test]
    fn test_empty_registry() {
        let mut registry = SessionRegistry::default();
        let report = BroadcastDispatcher::default().on_change(&mut registry, &app_js_modified());
        assert_eq!(report, DispatchReport::default());
    }
}
