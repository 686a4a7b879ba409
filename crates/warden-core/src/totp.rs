use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use totp_rs::{Algorithm, Secret, TOTP};

use crate::config::TwoFactorPolicy;
use crate::error::AuthError;
use crate::password::{generate_verification_code, PasswordHasher};

const STEP_SECS: u64 = 30;
const CODE_DIGITS: usize = 6;

/// One-time payload returned by provisioning.
///
/// `secret` and `backup_codes` are plaintext and must be shown to the
/// user once, then discarded — only the hashed forms are stored.
#[derive(Debug, Clone)]
pub struct ProvisionedSecret {
    /// Base32-encoded TOTP shared secret.
    pub secret: String,
    /// otpauth:// URI for QR code generation.
    pub provisioning_uri: String,
    /// Plaintext single-use backup codes.
    pub backup_codes: Vec<String>,
}

/// Lifecycle of a user's two-factor enrollment. Absence of a credential
/// record is the unprovisioned state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TwoFactorStatus {
    /// Secret issued but not yet confirmed with a valid code.
    Provisioned,
    /// Confirmed; ongoing login verification is accepted.
    Active,
    /// Disabled by the user or an administrator.
    Revoked,
}

/// A user's stored two-factor credential: the shared secret plus hashed
/// single-use backup codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorCredential {
    /// Base32-encoded TOTP shared secret.
    pub secret: String,
    /// Argon2 hashes of the remaining backup codes.
    pub backup_codes: Vec<String>,
    pub status: TwoFactorStatus,
}

impl TwoFactorCredential {
    /// Whether this credential accepts login verification.
    pub fn accepts_login(&self) -> bool {
        self.status == TwoFactorStatus::Active
    }

    /// Confirm enrollment after the caller has checked a code with
    /// [`TwoFactorAuthenticator::verify_token`]. Returns `false` unless
    /// the credential was in the provisioned state.
    pub fn confirm(&mut self) -> bool {
        if self.status == TwoFactorStatus::Provisioned {
            self.status = TwoFactorStatus::Active;
            true
        } else {
            false
        }
    }

    /// Revoke this credential. Idempotent.
    pub fn revoke(&mut self) {
        self.status = TwoFactorStatus::Revoked;
    }

    /// Check a submitted backup code and, on match, remove its hash so
    /// the code can never be replayed.
    ///
    /// Check and removal happen under the same `&mut` borrow; exclusive
    /// access to the stored credential is the serialization point for
    /// concurrent submissions of the same code.
    pub fn consume_backup_code(
        &mut self,
        submitted: &str,
        authenticator: &TwoFactorAuthenticator,
    ) -> bool {
        if !self.accepts_login() {
            return false;
        }
        match authenticator.verify_backup_code(submitted, &self.backup_codes) {
            Some(index) => {
                self.backup_codes.remove(index);
                true
            }
            None => false,
        }
    }
}

/// TOTP secret provisioning and verification with a time-skew window.
#[derive(Debug, Clone)]
pub struct TwoFactorAuthenticator {
    policy: TwoFactorPolicy,
    hasher: PasswordHasher,
}

impl TwoFactorAuthenticator {
    pub fn new(policy: TwoFactorPolicy, hasher: PasswordHasher) -> Self {
        Self { policy, hasher }
    }

    fn build_totp(
        &self,
        secret_bytes: Vec<u8>,
        issuer: Option<String>,
        account: String,
    ) -> Result<TOTP, AuthError> {
        TOTP::new(
            Algorithm::SHA1,
            CODE_DIGITS,
            self.policy.window,
            STEP_SECS,
            secret_bytes,
            issuer,
            account,
        )
        .map_err(|e| AuthError::Internal(format!("Failed to create TOTP: {}", e)))
    }

    /// Decode a stored secret, rejecting anything that is not valid
    /// unpadded base32. Verification paths treat a `None` here as a
    /// failed check rather than an error.
    fn decode_secret(&self, secret_base32: &str) -> Option<Vec<u8>> {
        if secret_base32.is_empty() {
            return None;
        }
        base32::decode(base32::Alphabet::Rfc4648 { padding: false }, secret_base32)
    }

    /// Generate a fresh shared secret and backup codes for a user.
    ///
    /// Returns the base32 secret, the otpauth:// provisioning URI
    /// embedding the policy issuer and `account`, and
    /// `backup_code_count` plaintext backup codes. The caller must
    /// confirm enrollment with a valid code before the credential
    /// accepts logins.
    pub fn generate_secret(&self, account: &str) -> Result<ProvisionedSecret, AuthError> {
        let secret = Secret::generate_secret();
        let secret_bytes = secret.to_bytes().map_err(|e| {
            AuthError::Internal(format!("Failed to generate TOTP secret bytes: {:?}", e))
        })?;

        let totp = self.build_totp(
            secret_bytes,
            Some(self.policy.issuer.clone()),
            account.to_string(),
        )?;

        let backup_codes = (0..self.policy.backup_code_count)
            .map(|_| generate_verification_code(self.policy.backup_code_length))
            .collect();

        Ok(ProvisionedSecret {
            secret: secret.to_encoded().to_string(),
            provisioning_uri: totp.get_url(),
            backup_codes,
        })
    }

    /// Provision a stored credential together with its one-time plaintext
    /// payload. The credential starts in the provisioned state with the
    /// backup codes already hashed.
    pub fn provision(
        &self,
        account: &str,
    ) -> Result<(TwoFactorCredential, ProvisionedSecret), AuthError> {
        let provisioned = self.generate_secret(account)?;
        let credential = TwoFactorCredential {
            secret: provisioned.secret.clone(),
            backup_codes: self.hash_backup_codes(&provisioned.backup_codes)?,
            status: TwoFactorStatus::Provisioned,
        };
        Ok((credential, provisioned))
    }

    /// Verify a submitted TOTP code against a stored secret, accepting
    /// the current 30-second step and `window` steps either side of it.
    ///
    /// Malformed or empty secrets and codes yield `false`, never an
    /// error, so repeated failures can feed an external limiter.
    pub fn verify_token(&self, secret_base32: &str, code: &str) -> bool {
        self.checked_totp(secret_base32)
            .map(|totp| totp.check_current(code).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Deterministic-time variant of [`verify_token`] for admin tooling
    /// and tests.
    ///
    /// [`verify_token`]: TwoFactorAuthenticator::verify_token
    pub fn verify_token_at(&self, secret_base32: &str, code: &str, timestamp: u64) -> bool {
        self.checked_totp(secret_base32)
            .map(|totp| totp.check(code, timestamp))
            .unwrap_or(false)
    }

    /// Compute the code for an arbitrary time step.
    pub fn generate_token_at(&self, secret_base32: &str, timestamp: u64) -> Option<String> {
        self.checked_totp(secret_base32)
            .map(|totp| totp.generate(timestamp))
    }

    /// Compute the currently valid code for display in test/admin
    /// tooling. Not part of the login path.
    pub fn get_current_token(&self, secret_base32: &str) -> Option<String> {
        self.checked_totp(secret_base32)
            .and_then(|totp| totp.generate_current().ok())
    }

    /// Seconds until the current code rolls over.
    pub fn time_remaining(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        STEP_SECS - (now % STEP_SECS)
    }

    fn checked_totp(&self, secret_base32: &str) -> Option<TOTP> {
        let bytes = self.decode_secret(secret_base32)?;
        self.build_totp(bytes, None, String::new()).ok()
    }

    /// Hash backup codes for storage. Plaintext codes must be discarded
    /// after they have been shown to the user.
    pub fn hash_backup_codes(&self, codes: &[String]) -> Result<Vec<String>, AuthError> {
        codes.iter().map(|code| self.hasher.hash(code)).collect()
    }

    /// Pure check of a submitted backup code against stored hashes.
    ///
    /// Returns the index of the matching hash so the call site can remove
    /// it atomically with the check — see
    /// [`TwoFactorCredential::consume_backup_code`].
    pub fn verify_backup_code(&self, submitted: &str, hashed: &[String]) -> Option<usize> {
        hashed
            .iter()
            .position(|hash| self.hasher.verify(submitted, hash))
    }
}
