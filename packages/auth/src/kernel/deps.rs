//! Dependency container for the login orchestrator (traits for testability)
//!
//! `ActorHandle` is the live slot the external connection manager fills
//! once the RPC client finishes constructing; the orchestrator only ever
//! observes it and must re-read it after every suspension point.

use std::sync::{Arc, RwLock};

use crate::kernel::traits::{CacheInvalidator, IdentityProvider, OtpActor, SessionStore};

/// Live reference to the externally-owned RPC actor.
///
/// Absence is a normal transient state while the connection manager is
/// still initializing, not an error.
#[derive(Clone, Default)]
pub struct ActorHandle {
    slot: Arc<RwLock<Option<Arc<dyn OtpActor>>>>,
}

impl ActorHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the connection manager once the actor is constructed.
    pub fn set(&self, actor: Arc<dyn OtpActor>) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(actor);
    }

    /// Called by the connection manager when the identity changes and
    /// the actor must be rebuilt.
    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Current actor, if constructed.
    pub fn get(&self) -> Option<Arc<dyn OtpActor>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.clone()
    }

    pub fn is_available(&self) -> bool {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.is_some()
    }
}

/// External collaborators handed to `MobileAuth`.
#[derive(Clone)]
pub struct AuthDeps {
    pub identity: Arc<dyn IdentityProvider>,
    pub actor: ActorHandle,
    pub store: Arc<dyn SessionStore>,
    pub cache: Arc<dyn CacheInvalidator>,
}
