use warden_core::config::LockoutPolicy;
use warden_core::error::AuthError;
use warden_core::lockout::LockoutTracker;

fn tracker(max_attempts: u32, duration_secs: u64) -> LockoutTracker {
    LockoutTracker::new(LockoutPolicy {
        max_attempts,
        window_secs: 300,
        duration_secs,
    })
}

#[test]
fn test_allows_under_threshold() {
    let tracker = tracker(3, 900);

    tracker.record_failure("user-1");
    tracker.record_failure("user-1");

    assert!(tracker.check("user-1").is_ok());
}

#[test]
fn test_locks_after_max_attempts() {
    let tracker = tracker(3, 900);

    for _ in 0..3 {
        assert!(tracker.check("user-1").is_ok());
        tracker.record_failure("user-1");
    }

    match tracker.check("user-1") {
        Err(AuthError::RateLimitExceeded { retry_after_secs }) => {
            assert!(retry_after_secs >= 1);
            assert!(retry_after_secs <= 900);
        }
        other => panic!("Expected RateLimitExceeded, got {:?}", other),
    }
}

#[test]
fn test_keys_are_independent() {
    let tracker = tracker(1, 900);

    tracker.record_failure("user-1");

    assert!(tracker.check("user-1").is_err());
    assert!(tracker.check("user-2").is_ok());
}

#[test]
fn test_reset_clears_failures() {
    let tracker = tracker(1, 900);

    tracker.record_failure("user-1");
    assert!(tracker.check("user-1").is_err());

    tracker.reset("user-1");
    assert!(tracker.check("user-1").is_ok());
}

#[test]
fn test_lock_expires() {
    // Zero-duration lock has already elapsed by the next check
    let tracker = tracker(1, 0);

    tracker.record_failure("user-1");
    assert!(tracker.check("user-1").is_ok());
}

#[test]
fn test_cleanup_preserves_active_locks() {
    let tracker = tracker(1, 900);

    tracker.record_failure("user-1");
    tracker.cleanup();

    assert!(tracker.check("user-1").is_err());
}
