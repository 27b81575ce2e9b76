//! Screen activation tokens
//!
//! Each time a screen becomes active it mints a fresh [`Activation`]. Loads
//! started for that activation are stamped with it, and their results are
//! only accepted while it is still current. Navigating away or reloading
//! supersedes the token, so late results are dropped instead of being
//! applied to a screen that has moved on.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use ulid::Ulid;

/// Token identifying one activation of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Activation(Ulid);

impl Activation {
    pub fn id(&self) -> Ulid {
        self.0
    }

    /// Wraps a result produced for this activation.
    pub fn stamp<T>(&self, value: T) -> Stamped<T> {
        Stamped {
            activation: *self,
            value,
        }
    }
}

/// A result tagged with the activation that requested it.
#[derive(Debug)]
pub struct Stamped<T> {
    activation: Activation,
    value: T,
}

impl<T> Stamped<T> {
    pub fn activation(&self) -> Activation {
        self.activation
    }
}

/// The current activation of one screen.
#[derive(Debug, Default)]
pub struct ScreenActivations {
    current: Mutex<Option<Ulid>>,
}

impl ScreenActivations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new activation, superseding any previous one.
    pub fn activate(&self) -> Activation {
        let id = Ulid::new();
        *self.lock() = Some(id);
        tracing::debug!(activation = %id, "screen activated");
        Activation(id)
    }

    /// Ends the current activation; every outstanding result becomes stale.
    pub fn deactivate(&self) {
        *self.lock() = None;
    }

    pub fn is_current(&self, activation: Activation) -> bool {
        *self.lock() == Some(activation.0)
    }

    /// Unwraps a result if its activation is still current.
    pub fn accept<T>(&self, stamped: Stamped<T>) -> Option<T> {
        if self.is_current(stamped.activation) {
            Some(stamped.value)
        } else {
            tracing::debug!(activation = %stamped.activation.0, "discarding stale result");
            None
        }
    }

    /// Waits up to `timeout` for a pending load of this screen.
    ///
    /// A load that is still running when the time is up is abandoned: the
    /// screen is deactivated, so its result is discarded whenever it
    /// arrives. The worker thread itself runs to completion.
    pub fn wait<T>(&self, pending: &Receiver<Stamped<T>>, timeout: Duration) -> LoadOutcome<T> {
        match pending.recv_timeout(timeout) {
            Ok(stamped) => match self.accept(stamped) {
                Some(value) => LoadOutcome::Ready(value),
                None => LoadOutcome::Superseded,
            },
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(?timeout, "screen load timed out");
                self.deactivate();
                LoadOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => LoadOutcome::Lost,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Ulid>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Result of waiting for a screen load.
#[derive(Debug, PartialEq)]
pub enum LoadOutcome<T> {
    Ready(T),
    /// The screen moved on before the result arrived
    Superseded,
    /// The load did not finish in time and was abandoned
    TimedOut,
    /// The loader panicked
    Lost,
}

/// Runs `load` on a worker thread and delivers its stamped result.
///
/// The receiver yields nothing if the loader panics.
pub fn spawn_load<T, F>(activation: Activation, load: F) -> Receiver<Stamped<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The screen may have stopped listening; that is fine
        let _ = tx.send(activation.stamp(load()));
    });
    rx
}
