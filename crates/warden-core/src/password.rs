use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2, Params,
};
use rand::seq::SliceRandom;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::config::PasswordPolicy;
use crate::error::AuthError;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()-_=+[]{}<>?";

/// Result of a password strength evaluation.
///
/// Validity and score are independent: `is_valid` reflects only the rules
/// the policy requires, while `score` grades the password 0..=5 against
/// all character classes plus length bonuses.
#[derive(Debug, Clone)]
pub struct StrengthReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub score: u8,
}

/// Policy-driven password hashing, verification, and strength scoring.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    policy: PasswordPolicy,
}

impl PasswordHasher {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            self.policy.hash_cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| AuthError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }

    /// Hash a plaintext password using Argon2id with a fresh random salt.
    ///
    /// Hashing the same password twice yields different strings; equality
    /// must be checked with [`PasswordHasher::verify`], never string
    /// comparison.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// A malformed hash yields `false` rather than an error, so callers
    /// treat every verification failure uniformly.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Evaluate a password against the policy rules and score it 0..=5.
    pub fn validate_strength(&self, plaintext: &str) -> StrengthReport {
        let policy = &self.policy;
        let mut errors = Vec::new();

        let long_enough = plaintext.len() >= policy.min_length;
        let has_upper = plaintext.chars().any(|c| c.is_uppercase());
        let has_lower = plaintext.chars().any(|c| c.is_lowercase());
        let has_digit = plaintext.chars().any(|c| c.is_ascii_digit());
        let has_special = plaintext.chars().any(|c| !c.is_alphanumeric());

        if !long_enough {
            errors.push(format!(
                "Password must be at least {} characters long",
                policy.min_length
            ));
        }
        if policy.require_uppercase && !has_upper {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if policy.require_lowercase && !has_lower {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if policy.require_digit && !has_digit {
            errors.push("Password must contain at least one digit".to_string());
        }
        if policy.require_special && !has_special {
            errors.push("Password must contain at least one special character".to_string());
        }

        let base = [long_enough, has_upper, has_lower, has_digit, has_special]
            .iter()
            .filter(|&&ok| ok)
            .count() as u8;

        let mut bonus = 0u8;
        if plaintext.len() >= 12 {
            bonus += 1;
        }
        if plaintext.chars().any(|c| c.is_ascii_punctuation()) {
            bonus += 1;
        }
        if plaintext.len() >= 16 {
            bonus += 1;
        }

        StrengthReport {
            is_valid: errors.is_empty(),
            score: (base + bonus).min(5),
            errors,
        }
    }

    /// Generate a random password guaranteed to satisfy every required
    /// rule: one character is seeded from each required class before the
    /// remainder is filled from the full charset and shuffled.
    pub fn generate_random_password(&self, length: usize) -> Result<String, AuthError> {
        let policy = &self.policy;
        let mut rng = rand::thread_rng();
        let mut chars: Vec<u8> = Vec::with_capacity(length);
        let mut full: Vec<u8> = Vec::new();

        for (required, class) in [
            (policy.require_uppercase, UPPERCASE),
            (policy.require_lowercase, LOWERCASE),
            (policy.require_digit, DIGITS),
            (policy.require_special, SPECIAL),
        ] {
            full.extend_from_slice(class);
            if required {
                chars.push(class[rng.gen_range(0..class.len())]);
            }
        }

        if length < chars.len() {
            return Err(AuthError::MalformedInput(format!(
                "Password length {} cannot satisfy {} required character classes",
                length,
                chars.len()
            )));
        }

        while chars.len() < length {
            chars.push(full[rng.gen_range(0..full.len())]);
        }
        chars.shuffle(&mut rng);

        String::from_utf8(chars)
            .map_err(|e| AuthError::Internal(format!("Generated non-UTF8 password: {}", e)))
    }
}

/// Generate a cryptographically secure random token (hex-encoded).
///
/// `len_bytes` is the entropy in bytes; the returned string is twice as
/// long. Callers own expiry and delivery.
pub fn generate_secure_token(len_bytes: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut bytes = vec![0u8; len_bytes];
    rng.fill(&mut bytes[..]);
    hex::encode(bytes)
}

/// Generate a random numeric verification code of `length` digits.
pub fn generate_verification_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// SHA-256 digest of a token for safe at-rest storage.
pub fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
