//! Actor availability monitoring.
//!
//! The RPC actor is constructed asynchronously by an external connection
//! manager; this module polls the live handle until it appears or a
//! budget elapses, publishing the `Connecting → Ready | Error`
//! transitions the UI renders.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::common::{ConnectionStatus, StatusCell};
use crate::kernel::ActorHandle;

/// Poll `predicate` every `interval` until it holds or `timeout`
/// elapses. Returns whether the condition was observed in time.
///
/// The predicate is re-evaluated from scratch on every tick, so it must
/// read live state rather than a snapshot taken at call time.
pub async fn await_condition<F>(predicate: F, interval: Duration, timeout: Duration) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Watches the externally-owned actor handle.
#[derive(Clone)]
pub struct ActorMonitor {
    handle: ActorHandle,
    status: Arc<StatusCell>,
    poll_interval: Duration,
}

impl ActorMonitor {
    pub fn new(
        handle: ActorHandle,
        status: Arc<StatusCell>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            handle,
            status,
            poll_interval,
        }
    }

    /// Wait for the actor handle to be constructed.
    ///
    /// Sets status to `Connecting` while polling, then `Ready` on
    /// success or `Error` on timeout. Never fails with an error; the
    /// caller decides what an unavailable actor means.
    pub async fn wait_for_actor(&self, timeout: Duration) -> bool {
        self.status.set(ConnectionStatus::Connecting);
        debug!("waiting for actor handle (budget {}ms)", timeout.as_millis());

        let handle = self.handle.clone();
        let available =
            await_condition(|| handle.is_available(), self.poll_interval, timeout).await;

        if available {
            debug!("actor handle available");
            self.status.set(ConnectionStatus::Ready);
        } else {
            warn!(
                "actor handle did not appear within {}ms",
                timeout.as_millis()
            );
            self.status.set(ConnectionStatus::Error);
        }
        available
    }
}
