//! Event debouncing for change notification.
//!
//! Coalesces multiple change events into single events per path, reducing
//! duplicate reloads when editors emit several events per save
//! (write temp file, rename over the original, touch metadata).

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::event::{ChangeEvent, ChangeKind};

/// Pending event waiting to be emitted.
struct PendingEvent {
    kind: ChangeKind,
    deadline: Instant,
}

/// Per-path event debouncer.
///
/// Owned by a single consumer task: [`record`](Self::record) raw events as
/// they arrive and periodically [`drain_ready`](Self::drain_ready) the ones
/// whose quiet period has elapsed.
pub struct EventDebouncer {
    pending: HashMap<PathBuf, PendingEvent>,
    debounce_duration: Duration,
}

impl EventDebouncer {
    /// Create a new debouncer with the specified debounce duration.
    pub fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            debounce_duration,
        }
    }

    /// Record an event, restarting the quiet period for its path.
    pub fn record(&mut self, event: ChangeEvent) {
        let deadline = Instant::now() + self.debounce_duration;

        match self.pending.entry(event.path) {
            Entry::Vacant(entry) => {
                entry.insert(PendingEvent {
                    kind: event.kind,
                    deadline,
                });
            }
            Entry::Occupied(mut entry) => {
                if let Some(kind) = Self::coalesce(entry.get().kind, event.kind) {
                    let pending = entry.get_mut();
                    pending.kind = kind;
                    pending.deadline = deadline;
                } else {
                    // Created then deleted: nothing happened as far as a reader can tell
                    entry.remove();
                }
            }
        }
    }

    /// Coalesce two event kinds.
    ///
    /// Returns `None` if both events should be discarded (created + deleted).
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: ChangeKind, new: ChangeKind) -> Option<ChangeKind> {
        use ChangeKind::{Created, Deleted, Modified, Renamed};

        match (existing, new) {
            (Created, Created | Modified | Renamed) => Some(Created),
            (Created, Deleted) => None,

            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Renamed) => Some(Modified),
            (Modified, Deleted) => Some(Deleted),

            (Renamed, Created) => Some(Created),
            (Renamed, Modified) => Some(Modified),
            (Renamed, Renamed) => Some(Renamed),
            (Renamed, Deleted) => Some(Deleted),

            // Something was put back where the old file was
            (Deleted, Created | Renamed) => Some(Modified),
            (Deleted, Modified | Deleted) => Some(Deleted),
        }
    }

    /// Drain events that have passed their debounce deadline.
    pub fn drain_ready(&mut self) -> Vec<ChangeEvent> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.pending.retain(|path, event| {
            if event.deadline <= now {
                ready.push(ChangeEvent::new(path.clone(), event.kind));
                false
            } else {
                true
            }
        });

        ready
    }

}
