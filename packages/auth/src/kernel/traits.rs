// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no login logic. The
// orchestrator (domains/login) owns sequencing, retries, and timeouts;
// everything here is an external collaborator observed or triggered
// through a narrow seam so tests can swap in fakes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::common::AuthError;

// =============================================================================
// Identity provider
// =============================================================================

/// The principal established by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Named(String),
}

/// A snapshot of the caller's identity, owned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub principal: Principal,
}

impl Identity {
    pub fn named(principal: impl Into<String>) -> Self {
        Self {
            principal: Principal::Named(principal.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            principal: Principal::Anonymous,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.principal == Principal::Anonymous
    }
}

/// Externally observed progress of the provider's login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Idle,
    LoggingIn,
    LoginError,
}

/// Structured login failure reported by the provider.
///
/// `AlreadyAuthenticated` exists because the provider may report an
/// error even though the identity did come up; the gate reconciles
/// that case instead of matching on message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    AlreadyAuthenticated,
    Failed(String),
}

/// External identity provider, read through live references.
///
/// `login` is a best-effort trigger with no return contract; completion
/// is observed only through `identity` and `login_status`, which must
/// re-read the provider's current state on every call.
pub trait IdentityProvider: Send + Sync {
    fn login(&self);
    fn identity(&self) -> Option<Identity>;
    fn login_status(&self) -> LoginStatus;
    fn login_error(&self) -> Option<LoginError>;
}

// =============================================================================
// RPC actor
// =============================================================================

/// The backend OTP operations, behind an already-typed async client.
///
/// Implementations map their transport errors into `AuthError`:
/// `Validation` for requests the backend rejected as malformed (never
/// retried), `Transient` for everything else.
#[async_trait]
pub trait OtpActor: Send + Sync {
    /// Issue an OTP for the mobile number; returns the generated code.
    async fn generate_otp(&self, mobile: &str) -> Result<String, AuthError>;

    /// Check an OTP code. `Ok(false)` means wrong/expired code, which is
    /// distinct from a connectivity failure.
    async fn verify_otp(&self, mobile: &str, otp: &str) -> Result<bool, AuthError>;
}

// =============================================================================
// Session persistence
// =============================================================================

/// Synchronous key-value store scoped to the browser session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory `SessionStore`, also the test fake.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}

// =============================================================================
// Cache invalidation
// =============================================================================

/// Logical cache keys whose reads depend on session/identity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    SessionState,
    CurrentUserProfile,
}

/// Sink for keyed cache invalidations after a verified login.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, key: CacheKey);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("otp_session"), None);

        store.set("otp_session", "{}");
        assert_eq!(store.get("otp_session").as_deref(), Some("{}"));

        store.remove("otp_session");
        assert_eq!(store.get("otp_session"), None);
    }

    #[test]
    fn test_identity_anonymity() {
        assert!(Identity::anonymous().is_anonymous());
        assert!(!Identity::named("principal-1").is_anonymous());
    }
}
