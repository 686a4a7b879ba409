pub mod config;
pub mod error;
pub mod issuer;
pub mod lockout;
pub mod logging;
pub mod password;
pub mod prelude;
pub mod session;
pub mod totp;

pub use config::AuthPolicy;
pub use error::AuthError;
pub use issuer::{Claims, CredentialIssuer, TokenKind, TokenPair};
pub use logging::{init_logging, init_logging_json};
pub use password::PasswordHasher;
pub use session::{InMemorySessionStore, Session, SessionStore};
pub use totp::{TwoFactorAuthenticator, TwoFactorCredential};
