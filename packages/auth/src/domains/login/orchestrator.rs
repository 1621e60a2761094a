//! Login orchestrator: the `send_otp` / `verify_otp` entrypoints.
//!
//! Each call runs five phases strictly in sequence: validate → identity
//! gate → actor availability → retry-wrapped RPC → persistence. There
//! is no mutual exclusion across calls; a second call racing the first
//! overwrites shared state last-write-wins, and a superseded call may
//! finish after the UI stopped reading its result.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::common::{AuthError, ConnectionStatus, StatusCell};
use crate::config::AuthConfig;
use crate::domains::login::gate::IdentityGate;
use crate::domains::login::models::{validate_mobile, validate_otp};
use crate::domains::login::monitor::ActorMonitor;
use crate::domains::login::retry::retry_with_backoff;
use crate::domains::login::session::{save_verified_mobile, OtpSession};
use crate::kernel::{AuthDeps, CacheKey};

/// Which entrypoint ran last, for UI messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Generate,
    Verify,
}

/// Observable snapshot read by the UI between operations.
#[derive(Debug, Clone, Default)]
struct AuthState {
    is_loading: bool,
    error: Option<String>,
    error_kind: Option<AuthError>,
    otp_sent: bool,
    mobile: Option<String>,
    generated_otp: Option<String>,
    last_action: Option<AuthAction>,
}

/// Client-side mobile-OTP authentication orchestrator.
pub struct MobileAuth {
    deps: AuthDeps,
    config: AuthConfig,
    status: Arc<StatusCell>,
    monitor: ActorMonitor,
    gate: IdentityGate,
    state: RwLock<AuthState>,
}

impl MobileAuth {
    pub fn new(deps: AuthDeps, config: AuthConfig) -> Self {
        let status = Arc::new(StatusCell::new());
        let monitor = ActorMonitor::new(
            deps.actor.clone(),
            status.clone(),
            config.actor_poll_interval,
        );
        let gate = IdentityGate::new(
            deps.identity.clone(),
            monitor.clone(),
            status.clone(),
            &config,
        );
        Self {
            deps,
            config,
            status,
            monitor,
            gate,
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Issue an OTP for `mobile`.
    ///
    /// Returns whether the code was issued; on failure the categorized
    /// message is available via `error()`. Connection status is reset
    /// to `Idle` in both outcomes.
    pub async fn send_otp(&self, mobile: &str) -> bool {
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
            state.error_kind = None;
            state.generated_otp = None;
            state.last_action = Some(AuthAction::Generate);
        });
        self.status.set(ConnectionStatus::Initializing);

        let outcome = self.generate_flow(mobile).await;

        self.status.set(ConnectionStatus::Idle);
        self.finish(outcome, "send OTP")
    }

    /// Check an OTP code for `mobile`.
    ///
    /// A wrong/expired code and a connectivity failure both return
    /// `false` but carry distinct error categories.
    pub async fn verify_otp(&self, mobile: &str, otp: &str) -> bool {
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
            state.error_kind = None;
            state.last_action = Some(AuthAction::Verify);
        });
        self.status.set(ConnectionStatus::Initializing);

        let outcome = self.verify_flow(mobile, otp).await;

        self.status.set(ConnectionStatus::Idle);
        self.finish(outcome, "verify OTP")
    }

    async fn generate_flow(&self, mobile: &str) -> Result<(), AuthError> {
        let mobile = validate_mobile(mobile)?;
        info!("starting OTP generation for {}", mobile);

        self.gate.ensure_authenticated().await?;

        if !self.monitor.wait_for_actor(self.config.actor_timeout).await {
            return Err(AuthError::ConnectionTimeout);
        }

        let actor_slot = self.deps.actor.clone();
        let number = mobile.clone();
        let otp = retry_with_backoff(self.config.retry, || {
            let actor_slot = actor_slot.clone();
            let number = number.clone();
            async move {
                // Re-read the live handle on every attempt; the
                // connection manager may tear it down mid-retry.
                let actor = actor_slot
                    .get()
                    .ok_or_else(|| AuthError::Transient("backend connection lost".to_string()))?;
                actor.generate_otp(&number).await
            }
        })
        .await?;

        let recorded_otp = self.config.self_serve_otp.then(|| otp.clone());
        let session = OtpSession {
            mobile: mobile.clone(),
            issued_at: Utc::now(),
            otp: recorded_otp.clone(),
        };
        session.save(self.deps.store.as_ref());
        info!("OTP issued for {}", mobile);

        self.update(|state| {
            state.mobile = Some(mobile.clone());
            state.otp_sent = true;
            state.generated_otp = recorded_otp.clone();
        });
        Ok(())
    }

    async fn verify_flow(&self, mobile: &str, otp: &str) -> Result<(), AuthError> {
        let mobile = mobile.trim().to_string();
        let otp = validate_otp(otp)?;
        info!("starting OTP verification for {}", mobile);

        if !self.monitor.wait_for_actor(self.config.actor_timeout).await {
            return Err(AuthError::ConnectionTimeout);
        }

        let actor_slot = self.deps.actor.clone();
        let number = mobile.clone();
        let code = otp.clone();
        let valid = retry_with_backoff(self.config.retry, || {
            let actor_slot = actor_slot.clone();
            let number = number.clone();
            let code = code.clone();
            async move {
                let actor = actor_slot
                    .get()
                    .ok_or_else(|| AuthError::Transient("backend connection lost".to_string()))?;
                actor.verify_otp(&number, &code).await
            }
        })
        .await?;

        if !valid {
            // Wrong/expired code: a definitive backend answer, never a
            // connectivity failure and never retried.
            return Err(AuthError::InvalidCredential);
        }

        save_verified_mobile(self.deps.store.as_ref(), &mobile);
        self.deps.cache.invalidate(CacheKey::SessionState);
        self.deps.cache.invalidate(CacheKey::CurrentUserProfile);
        info!("mobile {} verified", mobile);

        self.update(|state| state.mobile = Some(mobile.clone()));
        Ok(())
    }

    fn finish(&self, outcome: Result<(), AuthError>, operation: &str) -> bool {
        match outcome {
            Ok(()) => {
                self.update(|state| state.is_loading = false);
                true
            }
            Err(err) => {
                error!("{} failed: {}", operation, err);
                self.update(|state| {
                    state.is_loading = false;
                    state.error = Some(err.user_message());
                    state.error_kind = Some(err.clone());
                });
                false
            }
        }
    }

    // ---- observables -------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.read(|state| state.is_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|state| state.error.clone())
    }

    pub fn error_kind(&self) -> Option<AuthError> {
        self.read(|state| state.error_kind.clone())
    }

    pub fn otp_sent(&self) -> bool {
        self.read(|state| state.otp_sent)
    }

    pub fn mobile(&self) -> Option<String> {
        self.read(|state| state.mobile.clone())
    }

    /// The issued code, surfaced only in self-serve deployments.
    pub fn generated_otp(&self) -> Option<String> {
        self.read(|state| state.generated_otp.clone())
    }

    pub fn last_action(&self) -> Option<AuthAction> {
        self.read(|state| state.last_action)
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
    }

    fn read<T>(&self, f: impl FnOnce(&AuthState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }
}
