// Infrastructure layer: trait seams to external collaborators and the
// dependency container handed to the orchestrator.

pub mod deps;
pub mod traits;

pub use deps::{ActorHandle, AuthDeps};
pub use traits::{
    CacheInvalidator, CacheKey, Identity, IdentityProvider, LoginError, LoginStatus, MemoryStore,
    OtpActor, Principal, SessionStore,
};
