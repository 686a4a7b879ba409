use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::TokenPolicy;
use crate::error::AuthError;
use crate::session::{Session, SessionPatch, SessionStore};

/// Discriminates the two halves of a token pair. A refresh token must
/// never be accepted where an access token is required, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signed claims payload carried by both token types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Session ID binding this token to its revocable lineage
    pub sid: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// A freshly minted access/refresh pair. Transient — never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute access-token expiry, for client-side refresh scheduling.
    pub expires_at: NaiveDateTime,
}

/// Mints, verifies, and rotates signed token pairs against a session
/// store.
///
/// Construct one issuer at process startup with its policy and store
/// injected, and hand it by reference to request handlers. Access tokens
/// are verified statelessly; the store is consulted only on `refresh`,
/// which is where server-side revocation takes effect.
#[derive(Clone)]
pub struct CredentialIssuer {
    policy: TokenPolicy,
    store: Arc<dyn SessionStore>,
}

impl CredentialIssuer {
    pub fn new(policy: TokenPolicy, store: Arc<dyn SessionStore>) -> Self {
        Self { policy, store }
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.policy.signing_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn claims(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        session_id: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
        ttl_secs: u64,
    ) -> Claims {
        Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            sid: session_id.to_string(),
            kind,
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(ttl_secs as i64)).timestamp() as usize,
        }
    }

    fn mint_pair(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let access = self.claims(
            user_id,
            email,
            role,
            session_id,
            TokenKind::Access,
            now,
            self.policy.access_ttl_secs,
        );
        let refresh = self.claims(
            user_id,
            email,
            role,
            session_id,
            TokenKind::Refresh,
            now,
            self.policy.refresh_ttl_secs,
        );

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            expires_at: (now + Duration::seconds(self.policy.access_ttl_secs as i64)).naive_utc(),
        })
    }

    /// Mint a token pair for a user and create its session record.
    ///
    /// Both tokens carry the same fresh session id; the session row is
    /// persisted with the refresh expiry. A store failure fails the whole
    /// operation.
    pub async fn issue(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        client_hint: Option<String>,
    ) -> Result<TokenPair, AuthError> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let pair = self.mint_pair(user_id, email, role, &session_id, now)?;

        let session = Session {
            id: session_id.clone(),
            user_id: user_id.to_string(),
            issued_at: now.naive_utc(),
            expires_at: (now + Duration::seconds(self.policy.refresh_ttl_secs as i64)).naive_utc(),
            is_active: true,
            client_hint,
        };
        self.store.create(session).await?;

        tracing::debug!(session_id = %session_id, "issued token pair");
        Ok(pair)
    }

    /// Validate signature and expiry of a token, returning its claims.
    ///
    /// Stateless fast path: the session store is not consulted, so a
    /// revoked session's outstanding access token stays valid until its
    /// short expiry elapses. Returns `None` on any failure — expired,
    /// malformed, wrong signature, or structurally invalid claims.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.policy.signing_secret.as_bytes()),
            &Validation::default(),
        )
        .ok()
        .map(|data| data.claims)
    }

    /// [`verify`], plus the token must be an access token. The guard for
    /// request handling.
    ///
    /// [`verify`]: CredentialIssuer::verify
    pub fn verify_access(&self, token: &str) -> Option<Claims> {
        self.verify(token)
            .filter(|claims| claims.kind == TokenKind::Access)
    }

    /// Rotate a refresh token into a brand-new pair.
    ///
    /// The token must verify, carry the refresh type, and reference a
    /// session that exists and is still active — this lookup is the sole
    /// point where server-side revocation takes effect. On success the
    /// new pair reuses the same session id and the session row's expiry
    /// is extended in place.
    ///
    /// The consumed token value is not blacklisted; the session row is
    /// the revocation authority. A retained copy that is still within
    /// its own expiry can rotate this same session again until the
    /// session is invalidated — deployments wanting strict single-use
    /// refresh tokens should layer a per-token deny-list into their
    /// `SessionStore`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let data = decode::<Claims>(
            refresh_token,
            &DecodingKey::from_secret(self.policy.signing_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
            _ => AuthError::MalformedInput("refresh token rejected".to_string()),
        })?;
        let claims = data.claims;

        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::MalformedInput(
                "token is not a refresh token".to_string(),
            ));
        }

        let session = self
            .store
            .get_by_id(&claims.sid)
            .await?
            .ok_or(AuthError::RevokedSession)?;

        if !session.is_active {
            tracing::warn!(session_id = %claims.sid, "refresh attempted against inactive session");
            return Err(AuthError::RevokedSession);
        }

        let now = Utc::now();
        let pair = self.mint_pair(&claims.sub, &claims.email, &claims.role, &claims.sid, now)?;

        self.store
            .update(
                &claims.sid,
                SessionPatch {
                    expires_at: Some(
                        (now + Duration::seconds(self.policy.refresh_ttl_secs as i64)).naive_utc(),
                    ),
                    is_active: None,
                },
            )
            .await?;

        tracing::debug!(session_id = %claims.sid, "rotated token pair");
        Ok(pair)
    }

    /// Deactivate one session (logout). Idempotent; unknown ids are a
    /// no-op.
    pub async fn invalidate(&self, session_id: &str) -> Result<(), AuthError> {
        self.store
            .update(
                session_id,
                SessionPatch {
                    expires_at: None,
                    is_active: Some(false),
                },
            )
            .await
    }

    /// Deactivate every session belonging to a user — "log out
    /// everywhere", forced revocation after a password change or
    /// suspected compromise.
    pub async fn invalidate_all_for_user(&self, user_id: &str) -> Result<(), AuthError> {
        self.store.set_active_for_user(user_id, false).await
    }

    /// All of a user's sessions, for device listings and revocation UIs.
    pub async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<Session>, AuthError> {
        self.store.list_by_user(user_id).await
    }
}
