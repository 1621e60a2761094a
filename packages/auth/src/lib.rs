// Mobile OTP Login Orchestrator
//
// Client-side coordination of three independently-failing dependencies:
// an external identity-provider login, a lazily-initialized RPC actor,
// and the OTP challenge/response exchange against that actor.
//
// The UI layer consumes `MobileAuth` (domains/login) and renders the
// observable connection status; everything external lives behind the
// traits in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
