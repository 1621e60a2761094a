// Common types shared across the crate

pub mod errors;
pub mod status;

pub use errors::AuthError;
pub use status::{ConnectionStatus, StatusCell};
