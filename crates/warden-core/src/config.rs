use serde::Deserialize;

/// Authentication policy loaded from environment variables.
///
/// Construct one `AuthPolicy` at process start and pass it (or its
/// sub-policies) into each component's constructor. Business logic never
/// reads configuration from ambient global state.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPolicy {
    pub token: TokenPolicy,
    pub password: PasswordPolicy,
    pub lockout: LockoutPolicy,
    pub two_factor: TwoFactorPolicy,
}

/// Token lifetimes and signing material.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPolicy {
    /// HMAC signing secret for both token types.
    pub signing_secret: String,

    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    ///
    /// Access tokens are verified statelessly, so a revoked session's
    /// outstanding access token stays valid until this elapses. Keep it
    /// short — minutes, not hours.
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds (default: 30 days).
    pub refresh_ttl_secs: u64,
}

/// Password complexity rules and hashing cost.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length (default: 8).
    pub min_length: usize,

    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,

    /// Argon2 time cost (iterations, default: 3).
    pub hash_cost: u32,
}

/// Failed-attempt thresholds for account lockout.
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutPolicy {
    /// Failed attempts within the window before a key locks (default: 5).
    pub max_attempts: u32,

    /// Attempt-counting window in seconds (default: 300).
    pub window_secs: u64,

    /// How long a locked key stays locked, in seconds (default: 900).
    pub duration_secs: u64,
}

/// TOTP provisioning and verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TwoFactorPolicy {
    /// Issuer label embedded in provisioning URIs.
    pub issuer: String,

    /// Accepted clock drift, in 30-second steps either side of now
    /// (default: 1, i.e. three candidate codes).
    pub window: u8,

    /// Digits per backup code (default: 8).
    pub backup_code_length: usize,

    /// Backup codes generated per provisioning (default: 10).
    pub backup_code_count: usize,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

impl AuthPolicy {
    /// Load the policy from environment variables (with .env support).
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        AuthPolicy {
            token: TokenPolicy {
                signing_secret: std::env::var("AUTH_SIGNING_SECRET")
                    .unwrap_or_else(|_| "warden-dev-secret-change-me".to_string()),
                access_ttl_secs: env_u64("AUTH_ACCESS_TTL_SECS", 900),
                refresh_ttl_secs: env_u64("AUTH_REFRESH_TTL_SECS", 2_592_000),
            },
            password: PasswordPolicy {
                min_length: env_u64("AUTH_PASSWORD_MIN_LENGTH", 8) as usize,
                require_uppercase: env_bool("AUTH_PASSWORD_REQUIRE_UPPERCASE", true),
                require_lowercase: env_bool("AUTH_PASSWORD_REQUIRE_LOWERCASE", true),
                require_digit: env_bool("AUTH_PASSWORD_REQUIRE_DIGIT", true),
                require_special: env_bool("AUTH_PASSWORD_REQUIRE_SPECIAL", true),
                hash_cost: env_u64("AUTH_PASSWORD_HASH_COST", 3) as u32,
            },
            lockout: LockoutPolicy {
                max_attempts: env_u64("AUTH_LOCKOUT_MAX_ATTEMPTS", 5) as u32,
                window_secs: env_u64("AUTH_LOCKOUT_WINDOW_SECS", 300),
                duration_secs: env_u64("AUTH_LOCKOUT_DURATION_SECS", 900),
            },
            two_factor: TwoFactorPolicy {
                issuer: std::env::var("AUTH_TOTP_ISSUER")
                    .unwrap_or_else(|_| "warden".to_string()),
                window: env_u64("AUTH_TOTP_WINDOW", 1) as u8,
                backup_code_length: env_u64("AUTH_BACKUP_CODE_LENGTH", 8) as usize,
                backup_code_count: env_u64("AUTH_BACKUP_CODE_COUNT", 10) as usize,
            },
        }
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        TokenPolicy {
            signing_secret: "warden-dev-secret-change-me".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 2_592_000,
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        PasswordPolicy {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
            hash_cost: 3,
        }
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        LockoutPolicy {
            max_attempts: 5,
            window_secs: 300,
            duration_secs: 900,
        }
    }
}

impl Default for TwoFactorPolicy {
    fn default() -> Self {
        TwoFactorPolicy {
            issuer: "warden".to_string(),
            window: 1,
            backup_code_length: 8,
            backup_code_count: 10,
        }
    }
}

impl Default for AuthPolicy {
    fn default() -> Self {
        AuthPolicy {
            token: TokenPolicy::default(),
            password: PasswordPolicy::default(),
            lockout: LockoutPolicy::default(),
            two_factor: TwoFactorPolicy::default(),
        }
    }
}
