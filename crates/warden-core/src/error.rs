use thiserror::Error;

/// Standard error type for the Warden auth core.
///
/// Variants map one-to-one onto the internal failure taxonomy. At the
/// boundary, callers must only ever surface [`AuthError::user_message`];
/// the variant itself is for logging and metrics.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unparseable or structurally invalid input: empty password, garbage
    /// token, malformed secret. Rejected locally, never a server error.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A credential past its expiry. Callers treat this identically to a
    /// bad signature so the boundary does not leak which check failed.
    #[error("Credential has expired")]
    ExpiredCredential,

    /// A refresh was attempted against a session that is missing or no
    /// longer active.
    #[error("Session has been revoked")]
    RevokedSession,

    /// Too many failed attempts within the configured window.
    #[error("Rate limit exceeded, retry in {retry_after_secs} seconds")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// The session store failed or timed out. Always propagated as a
    /// failure of the calling operation, never treated as success.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine code for logging and metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedInput(_) => "MALFORMED_INPUT",
            AuthError::ExpiredCredential => "EXPIRED_CREDENTIAL",
            AuthError::RevokedSession => "REVOKED_SESSION",
            AuthError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            AuthError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The generic end-user message for this failure.
    ///
    /// All credential failures collapse to the same string so a caller
    /// cannot be used as an oracle for which factor failed.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::MalformedInput(_)
            | AuthError::ExpiredCredential
            | AuthError::RevokedSession => "invalid or expired session",
            AuthError::RateLimitExceeded { .. } => "too many attempts, try again later",
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                "service temporarily unavailable"
            }
        }
    }
}
