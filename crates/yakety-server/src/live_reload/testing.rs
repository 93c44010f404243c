//! Fake transports for live reload tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::registry::{SendError, Transport};

/// Transport that records every message it accepts.
pub(crate) struct RecordingTransport {
    messages: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    open: AtomicBool,
    fail_sends: bool,
}

impl RecordingTransport {
    /// An open transport that accepts every send.
    pub(crate) fn open() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            open: AtomicBool::new(true),
            fail_sends: false,
        }
    }

    /// A transport that looks open but rejects sends, as when the close
    /// signal has not been observed yet.
    pub(crate) fn broken() -> Self {
        Self {
            fail_sends: true,
            ..Self::open()
        }
    }

    pub(crate) fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send(&self, message: &str) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends || !self.is_open() {
            return Err(SendError::Closed);
        }
        self.messages.lock().unwrap().push(message.to_owned());
        Ok(())
    }
}
