use thiserror::Error;

/// Failure categories for the mobile OTP login flow.
///
/// The retry engine and the user-facing messaging both branch on the
/// variant, never on message content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed mobile number or OTP code. Never retried.
    #[error("{0}")]
    Validation(String),

    /// The user backed out of the identity-provider login.
    #[error("Login was cancelled")]
    Cancelled,

    /// Identity-provider login failed or did not complete in time.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// The RPC actor handle never appeared within its budget.
    #[error("Connection timed out")]
    ConnectionTimeout,

    /// Any other RPC/network failure. Absorbed by the retry engine
    /// until its attempt budget runs out.
    #[error("{0}")]
    Transient(String),

    /// The backend rejected the OTP code itself.
    #[error("Invalid or expired code")]
    InvalidCredential,
}

impl AuthError {
    /// Whether the retry engine may run the operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Transient(_))
    }

    /// Categorized message suitable for direct display.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::Cancelled => {
                "Login was cancelled. Please complete the identity login to continue.".to_string()
            }
            AuthError::LoginFailed(_) => {
                "Identity login did not complete. Please retry the login.".to_string()
            }
            AuthError::ConnectionTimeout => {
                "Connection timed out. Please refresh the page and try again.".to_string()
            }
            AuthError::Transient(_) => {
                "Service temporarily unavailable. Please try again in a moment.".to_string()
            }
            AuthError::InvalidCredential => {
                "Invalid or expired code. Please check and try again.".to_string()
            }
        }
    }
}
