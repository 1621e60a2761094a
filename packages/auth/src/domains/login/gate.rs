//! Identity gate: ensures a non-anonymous identity-provider session
//! exists before any OTP operation runs.
//!
//! The provider's `login()` is a fire-and-forget trigger; completion,
//! failure, and cancellation are all observed by polling the provider's
//! live `identity`/`login_status` references. A value read before a
//! suspension point is never assumed current afterward.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::common::{AuthError, ConnectionStatus, StatusCell};
use crate::config::AuthConfig;
use crate::domains::login::monitor::{await_condition, ActorMonitor};
use crate::kernel::{IdentityProvider, LoginError, LoginStatus};

/// How a login wait ended successfully.
enum LoginOutcome {
    /// A fresh login completed; the actor must be rebuilt.
    Completed,
    /// The provider errored with "already authenticated" while the
    /// identity was in fact concrete; no fresh login happened.
    AlreadyAuthenticated,
}

#[derive(Clone)]
pub struct IdentityGate {
    provider: Arc<dyn IdentityProvider>,
    monitor: ActorMonitor,
    status: Arc<StatusCell>,
    login_timeout: Duration,
    login_poll_interval: Duration,
    post_login_actor_timeout: Duration,
}

impl IdentityGate {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        monitor: ActorMonitor,
        status: Arc<StatusCell>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            provider,
            monitor,
            status,
            login_timeout: config.login_timeout,
            login_poll_interval: config.login_poll_interval,
            post_login_actor_timeout: config.post_login_actor_timeout,
        }
    }

    fn identity_is_concrete(&self) -> bool {
        self.provider
            .identity()
            .map(|identity| !identity.is_anonymous())
            .unwrap_or(false)
    }

    /// Ensure a non-anonymous identity exists, triggering a login when
    /// necessary. Resets connection status to `Idle` on every non-fast
    /// path so the caller's `Connecting` phase starts clean.
    pub async fn ensure_authenticated(&self) -> Result<(), AuthError> {
        if self.identity_is_concrete() {
            debug!("identity already established");
            return Ok(());
        }

        let outcome = if self.provider.login_status() == LoginStatus::LoggingIn {
            self.join_login_in_flight().await
        } else {
            self.trigger_login_and_wait().await
        };

        self.status.set(ConnectionStatus::Idle);
        outcome
    }

    /// A login is already in flight elsewhere; wait for it to settle.
    async fn join_login_in_flight(&self) -> Result<(), AuthError> {
        info!("identity login already in flight, waiting");
        self.status.set(ConnectionStatus::Authenticating);

        // No fresh login was triggered here, so the actor does not need
        // a rebuild regardless of how the wait settles.
        self.await_login_outcome(false).await.map(|_| ())
    }

    /// Trigger a fresh login and wait for the polled observables.
    async fn trigger_login_and_wait(&self) -> Result<(), AuthError> {
        info!("triggering identity provider login");
        self.status.set(ConnectionStatus::Authenticating);
        self.provider.login();

        match self.await_login_outcome(true).await? {
            LoginOutcome::AlreadyAuthenticated => Ok(()),
            LoginOutcome::Completed => {
                // A freshly-authenticated identity invalidates the old
                // RPC connection; wait for the rebuilt actor.
                if self
                    .monitor
                    .wait_for_actor(self.post_login_actor_timeout)
                    .await
                {
                    Ok(())
                } else {
                    Err(AuthError::LoginFailed(
                        "connection failed after authentication".to_string(),
                    ))
                }
            }
        }
    }

    /// Poll the provider until the login settles or the budget elapses.
    ///
    /// With `cancellable`, a status that reverts to `Idle` after having
    /// been `LoggingIn`, with the identity still anonymous, counts as
    /// user cancellation. The join path never treats `Idle` as terminal.
    async fn await_login_outcome(&self, cancellable: bool) -> Result<LoginOutcome, AuthError> {
        let saw_logging_in = Cell::new(false);

        let settled = await_condition(
            || {
                if self.identity_is_concrete() {
                    return true;
                }
                match self.provider.login_status() {
                    LoginStatus::LoggingIn => {
                        saw_logging_in.set(true);
                        false
                    }
                    LoginStatus::LoginError => true,
                    LoginStatus::Idle => cancellable && saw_logging_in.get(),
                }
            },
            self.login_poll_interval,
            self.login_timeout,
        )
        .await;

        if !settled {
            warn!(
                "identity login did not settle within {}s",
                self.login_timeout.as_secs()
            );
            return Err(AuthError::LoginFailed("login did not complete".to_string()));
        }

        // Classify from live state. The identity wins every race: a
        // provider error reported while the identity is in fact concrete
        // (its "already authenticated" case) is a success.
        if self.identity_is_concrete() {
            if self.provider.login_status() == LoginStatus::LoginError
                && self.provider.login_error() == Some(LoginError::AlreadyAuthenticated)
            {
                info!("provider reported already authenticated; identity is concrete");
                return Ok(LoginOutcome::AlreadyAuthenticated);
            }
            info!("identity login completed");
            return Ok(LoginOutcome::Completed);
        }

        match self.provider.login_status() {
            LoginStatus::LoginError => {
                let reason = match self.provider.login_error() {
                    Some(LoginError::Failed(msg)) => msg,
                    Some(LoginError::AlreadyAuthenticated) => {
                        "provider reported already authenticated without an identity".to_string()
                    }
                    None => "login failed".to_string(),
                };
                warn!("identity login failed: {}", reason);
                Err(AuthError::LoginFailed(reason))
            }
            LoginStatus::Idle => {
                info!("identity login cancelled by user");
                Err(AuthError::Cancelled)
            }
            // Settled predicate cannot leave us here, but re-reading
            // live state after the await may: treat as not completed.
            LoginStatus::LoggingIn => {
                Err(AuthError::LoginFailed("login did not complete".to_string()))
            }
        }
    }
}
