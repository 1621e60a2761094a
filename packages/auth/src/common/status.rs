use tokio::sync::watch;

/// User-facing connection state for a login attempt.
///
/// `Idle` is reachable from every state: each operation resets to it on
/// both success and failure. `Error` is only ever entered from
/// `Connecting`, by the actor monitor's timeout path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Initializing,
    Authenticating,
    Connecting,
    Ready,
    Error,
}

/// Shared, observable connection status.
///
/// Backed by a watch channel so the UI can subscribe to transitions;
/// the orchestrator and its sub-steps read the current value directly.
pub struct StatusCell {
    tx: watch::Sender<ConnectionStatus>,
}

impl StatusCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionStatus::Idle);
        Self { tx }
    }

    pub fn set(&self, status: ConnectionStatus) {
        // send_replace never fails even with no subscribers
        self.tx.send_replace(status);
    }

    pub fn get(&self) -> ConnectionStatus {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.tx.subscribe()
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}
