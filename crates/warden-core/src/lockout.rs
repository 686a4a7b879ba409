use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::LockoutPolicy;
use crate::error::AuthError;

/// In-memory failed-attempt tracker with lockout.
///
/// Counts failures per key (user id, email, or IP) in a sliding window;
/// once `max_attempts` is reached the key locks for `duration_secs`.
/// Wrap the pure verification calls with this from the outside — the
/// verification functions themselves stay side-effect-free and safely
/// callable at any frequency.
pub struct LockoutTracker {
    policy: LockoutPolicy,
    failures: Mutex<HashMap<String, KeyState>>,
}

struct KeyState {
    attempts: Vec<Instant>,
    locked_until: Option<Instant>,
}

impl LockoutTracker {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            policy,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether a key may attempt verification. Returns
    /// `Err(AuthError::RateLimitExceeded)` with the remaining lockout
    /// time while the key is locked.
    pub fn check(&self, key: &str) -> Result<(), AuthError> {
        let mut map = self.failures.lock().unwrap();
        let now = Instant::now();

        let locked_until = map.get(key).and_then(|state| state.locked_until);
        if let Some(locked_until) = locked_until {
            if now < locked_until {
                let retry_after_secs = (locked_until - now).as_secs().max(1);
                return Err(AuthError::RateLimitExceeded { retry_after_secs });
            }
            // Lock elapsed; start the key fresh.
            map.remove(key);
        }
        Ok(())
    }

    /// Record a failed attempt. Locks the key once the window holds
    /// `max_attempts` failures.
    pub fn record_failure(&self, key: &str) {
        let mut map = self.failures.lock().unwrap();
        let now = Instant::now();
        let cutoff = now - Duration::from_secs(self.policy.window_secs);

        let state = map.entry(key.to_string()).or_insert_with(|| KeyState {
            attempts: Vec::new(),
            locked_until: None,
        });
        state.attempts.retain(|t| *t > cutoff);
        state.attempts.push(now);

        if state.attempts.len() >= self.policy.max_attempts as usize {
            state.locked_until = Some(now + Duration::from_secs(self.policy.duration_secs));
            tracing::warn!(key = %key, "lockout threshold reached");
        }
    }

    /// Reset a key after a successful verification.
    pub fn reset(&self, key: &str) {
        let mut map = self.failures.lock().unwrap();
        map.remove(key);
    }

    /// Remove expired entries to prevent memory growth.
    /// Call this periodically (e.g. every 5 minutes).
    pub fn cleanup(&self) {
        let mut map = self.failures.lock().unwrap();
        let now = Instant::now();
        let cutoff = now - Duration::from_secs(self.policy.window_secs);
        map.retain(|_, state| {
            if let Some(locked_until) = state.locked_until {
                return now < locked_until;
            }
            state.attempts.retain(|t| *t > cutoff);
            !state.attempts.is_empty()
        });
    }
}
