//! Context implementation for cancellation and deadlines
//!
//! A [`Context`] is handed to every polling call. It never aborts a request
//! that is already in flight; callers check it before issuing the next one.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Why a context stopped accepting work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Canceled,
    DeadlineExceeded,
}

/// Context carries a cancellation signal and an optional deadline
///
/// Clones share the same cancellation signal, so cancelling any clone
/// cancels all of them.
#[derive(Clone)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Arc<watch::Sender<bool>>,
}

impl Context {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);

        Self {
            deadline: None,
            cancel: Arc::new(cancel),
        }
    }

    /// Derives a context that also expires after `timeout`. An earlier
    /// deadline inherited from `self` wins.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };

        Self {
            deadline: Some(deadline),
            cancel: Arc::clone(&self.cancel),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Returns the reason this context is no longer usable, if any.
    /// Cancellation takes precedence over an elapsed deadline.
    pub fn interrupted(&self) -> Option<Interrupted> {
        if self.is_cancelled() {
            return Some(Interrupted::Canceled);
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupted::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) {
        let mut receiver = self.cancel.subscribe();
        let cancelled = async move {
            // The sender lives as long as `self`, so this only returns on cancel.
            let _ = receiver.wait_for(|cancelled| *cancelled).await;
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = cancelled => {}
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => cancelled.await,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
