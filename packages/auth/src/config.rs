use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::login::retry::RetryPolicy;

/// Timeouts and policy knobs for the login orchestrator.
///
/// Defaults match production behavior; tests shrink the intervals.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Budget for the identity-provider login to complete.
    pub login_timeout: Duration,
    /// Poll interval while waiting on the provider's observables.
    pub login_poll_interval: Duration,
    /// Budget for the actor handle to appear before an OTP call.
    pub actor_timeout: Duration,
    /// Budget for the actor to be rebuilt after a fresh login.
    pub post_login_actor_timeout: Duration,
    /// Poll interval while waiting on the actor handle.
    pub actor_poll_interval: Duration,
    /// Retry budget for the OTP RPC calls.
    pub retry: RetryPolicy,
    /// When true, the generated OTP is persisted and surfaced to the
    /// caller instead of being delivered out-of-band (demo deployments).
    pub self_serve_otp: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_timeout: Duration::from_secs(45),
            login_poll_interval: Duration::from_millis(500),
            actor_timeout: Duration::from_secs(15),
            post_login_actor_timeout: Duration::from_secs(15),
            actor_poll_interval: Duration::from_millis(250),
            retry: RetryPolicy::default(),
            self_serve_otp: true,
        }
    }
}

impl AuthConfig {
    /// Load configuration overrides from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let mut config = Self::default();

        if let Ok(raw) = env::var("AUTH_LOGIN_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .context("AUTH_LOGIN_TIMEOUT_SECS must be a number")?;
            config.login_timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var("AUTH_ACTOR_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .context("AUTH_ACTOR_TIMEOUT_SECS must be a number")?;
            config.actor_timeout = Duration::from_secs(secs);
            config.post_login_actor_timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var("AUTH_RETRY_MAX_ATTEMPTS") {
            config.retry.max_attempts = raw
                .parse()
                .context("AUTH_RETRY_MAX_ATTEMPTS must be a number")?;
        }
        if let Ok(raw) = env::var("AUTH_RETRY_INITIAL_DELAY_MS") {
            let millis: u64 = raw
                .parse()
                .context("AUTH_RETRY_INITIAL_DELAY_MS must be a number")?;
            config.retry.initial_delay = Duration::from_millis(millis);
        }
        if let Ok(raw) = env::var("AUTH_SELF_SERVE_OTP") {
            config.self_serve_otp = raw
                .parse()
                .context("AUTH_SELF_SERVE_OTP must be true or false")?;
        }

        Ok(config)
    }
}
