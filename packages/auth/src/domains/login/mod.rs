//! Login domain - mobile OTP authentication orchestration
//!
//! Sequencing for one login attempt:
//!   validate → identity gate → actor availability → retry-wrapped RPC
//!   → session persistence / cache invalidation
//!
//! Responsibilities:
//! - Identity-provider login gating with timeout and cancellation
//! - Bounded retry with exponential backoff for the OTP RPC calls
//! - Persisted OTP session surviving page reloads
//! - User-facing connection status and error categorization

pub mod gate;
pub mod models;
pub mod monitor;
pub mod orchestrator;
pub mod retry;
pub mod session;

pub use models::{validate_mobile, validate_otp};
pub use orchestrator::{AuthAction, MobileAuth};
pub use session::OtpSession;
