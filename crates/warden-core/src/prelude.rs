//! Warden prelude — import everything you need with one line.
//!
//! ```rust,ignore
//! use warden_core::prelude::*;
//! ```

// ── Policy & errors ────────────────────────────────────────────
pub use crate::config::{AuthPolicy, LockoutPolicy, PasswordPolicy, TokenPolicy, TwoFactorPolicy};
pub use crate::error::AuthError;

// ── Components ─────────────────────────────────────────────────
pub use crate::issuer::{Claims, CredentialIssuer, TokenKind, TokenPair};
pub use crate::lockout::LockoutTracker;
pub use crate::password::{PasswordHasher, StrengthReport};
pub use crate::totp::{
    ProvisionedSecret, TwoFactorAuthenticator, TwoFactorCredential, TwoFactorStatus,
};

// ── Session store seam ─────────────────────────────────────────
pub use crate::session::{InMemorySessionStore, Session, SessionPatch, SessionStore};

// ── Logging ────────────────────────────────────────────────────
pub use crate::logging::{init_logging, init_logging_json};
