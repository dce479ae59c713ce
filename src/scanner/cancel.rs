use std::sync::Arc;
use tokio::sync::{watch, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Live,
    Cancelled,
    Finished,
}

/// Cancellation token shared by a scan task and its registry entry.
///
/// Besides the cancel signal it orders writes: the scan task persists under
/// a shared `live()` hold, and `transition()` takes the lock exclusively. Once
/// a transition returns, the task can start no further writes.
#[derive(Clone)]
pub struct CancelToken {
    state: Arc<RwLock<RunState>>,
    signal: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            state: Arc::new(RwLock::new(RunState::Live)),
            signal: Arc::new(signal),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.signal.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Shared hold while the run is live; `None` after cancel or finish.
    pub async fn live(&self) -> Option<RwLockReadGuard<'_, RunState>> {
        let guard = self.state.read().await;
        if *guard == RunState::Live {
            Some(guard)
        } else {
            None
        }
    }

    /// Move a live run to `next` and keep exclusive access until the guard
    /// drops. A cancelled run may be cancelled again, so a stop whose write
    /// failed can be retried. `None` for every other move out of a non-live state.
    pub async fn transition(&self, next: RunState) -> Option<RwLockWriteGuard<'_, RunState>> {
        let mut guard = self.state.write().await;
        let allowed = match (*guard, next) {
            (RunState::Live, _) => true,
            (RunState::Cancelled, RunState::Cancelled) => true,
            _ => false,
        };
        if !allowed {
            return None;
        }
        *guard = next;
        if next == RunState::Cancelled {
            self.signal.send_replace(true);
        }
        Some(guard)
    }
}
