use warden_core::config::{PasswordPolicy, TwoFactorPolicy};
use warden_core::password::PasswordHasher;
use warden_core::totp::{TwoFactorAuthenticator, TwoFactorCredential, TwoFactorStatus};

// Step-aligned reference timestamp for deterministic window tests.
const T0: u64 = 1_700_000_010;

fn authenticator() -> TwoFactorAuthenticator {
    authenticator_with(TwoFactorPolicy::default())
}

fn authenticator_with(policy: TwoFactorPolicy) -> TwoFactorAuthenticator {
    TwoFactorAuthenticator::new(policy, PasswordHasher::new(PasswordPolicy::default()))
}

#[test]
fn test_generate_secret_returns_secret_uri_and_codes() {
    let auth = authenticator();
    let provisioned = auth
        .generate_secret("user@example.com")
        .expect("Failed to generate secret");

    assert!(!provisioned.secret.is_empty());
    assert!(
        provisioned.provisioning_uri.starts_with("otpauth://totp/"),
        "URI should be otpauth format: {}",
        provisioned.provisioning_uri
    );
    assert!(
        provisioned.provisioning_uri.contains("warden"),
        "URI should embed the issuer label"
    );

    assert_eq!(provisioned.backup_codes.len(), 10);
    for code in &provisioned.backup_codes {
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn test_verify_current_token() {
    let auth = authenticator();
    let provisioned = auth
        .generate_secret("user@example.com")
        .expect("Failed to generate secret");

    let code = auth
        .get_current_token(&provisioned.secret)
        .expect("Failed to compute current token");

    assert!(auth.verify_token(&provisioned.secret, &code));
}

#[test]
fn test_verify_wrong_code_fails() {
    let auth = authenticator();
    let provisioned = auth
        .generate_secret("user@example.com")
        .expect("Failed to generate secret");

    let code = auth
        .generate_token_at(&provisioned.secret, T0)
        .expect("Failed to compute token");

    // A code differing in one digit cannot match the same candidate set
    let mut wrong: Vec<u8> = code.clone().into_bytes();
    wrong[0] = b'0' + ((wrong[0] - b'0' + 1) % 10);
    let wrong = String::from_utf8(wrong).expect("ascii digits");

    assert!(auth.verify_token_at(&provisioned.secret, &code, T0));
    assert!(!auth.verify_token_at(&provisioned.secret, &wrong, T0));
}

#[test]
fn test_window_tolerance() {
    // window = 1 accepts one 30-second step of drift either side
    let auth = authenticator_with(TwoFactorPolicy {
        window: 1,
        ..TwoFactorPolicy::default()
    });
    let provisioned = auth
        .generate_secret("user@example.com")
        .expect("Failed to generate secret");
    let code = auth
        .generate_token_at(&provisioned.secret, T0)
        .expect("Failed to compute token");

    assert!(auth.verify_token_at(&provisioned.secret, &code, T0));
    assert!(auth.verify_token_at(&provisioned.secret, &code, T0 + 30));
    assert!(auth.verify_token_at(&provisioned.secret, &code, T0 - 30));

    assert!(!auth.verify_token_at(&provisioned.secret, &code, T0 + 90));
    assert!(!auth.verify_token_at(&provisioned.secret, &code, T0 - 90));
}

#[test]
fn test_malformed_secret_returns_false() {
    let auth = authenticator();

    assert!(!auth.verify_token("", "123456"));
    assert!(!auth.verify_token("NOT!!VALID##BASE32", "123456"));
    assert!(!auth.verify_token("abc", "123456")); // too short once decoded
    assert!(auth.get_current_token("NOT!!VALID##BASE32").is_none());
}

#[test]
fn test_time_remaining_is_within_step() {
    let remaining = authenticator().time_remaining();
    assert!(remaining >= 1 && remaining <= 30, "got {}", remaining);
}

#[test]
fn test_backup_code_hash_and_verify() {
    let auth = authenticator_with(TwoFactorPolicy {
        backup_code_count: 3,
        ..TwoFactorPolicy::default()
    });

    let codes: Vec<String> = vec!["12345678".into(), "87654321".into(), "11112222".into()];
    let hashed = auth
        .hash_backup_codes(&codes)
        .expect("Failed to hash backup codes");

    assert_eq!(hashed.len(), 3);
    for hash in &hashed {
        assert!(hash.starts_with("$argon2"), "Codes must be stored hashed");
    }

    assert_eq!(auth.verify_backup_code("87654321", &hashed), Some(1));
    assert_eq!(auth.verify_backup_code("00000000", &hashed), None);
}

#[test]
fn test_backup_code_single_use() {
    let auth = authenticator_with(TwoFactorPolicy {
        backup_code_count: 2,
        ..TwoFactorPolicy::default()
    });
    let (mut credential, provisioned) = auth
        .provision("user@example.com")
        .expect("Failed to provision");
    assert!(credential.confirm());

    let code = provisioned.backup_codes[0].clone();

    assert!(credential.consume_backup_code(&code, &auth));
    assert!(
        !credential.consume_backup_code(&code, &auth),
        "A backup code must not be accepted twice"
    );
    assert_eq!(credential.backup_codes.len(), 1);
}

#[test]
fn test_credential_state_machine() {
    let auth = authenticator_with(TwoFactorPolicy {
        backup_code_count: 2,
        ..TwoFactorPolicy::default()
    });
    let (mut credential, provisioned) = auth
        .provision("user@example.com")
        .expect("Failed to provision");

    // Provisioned: secret exists but logins are not accepted yet
    assert_eq!(credential.status, TwoFactorStatus::Provisioned);
    assert!(!credential.accepts_login());
    assert!(
        !credential.consume_backup_code(&provisioned.backup_codes[0], &auth),
        "Backup codes must not work before confirmation"
    );

    // Confirm after the user proves possession of the secret
    let code = auth
        .get_current_token(&credential.secret)
        .expect("Failed to compute token");
    assert!(auth.verify_token(&credential.secret, &code));
    assert!(credential.confirm());
    assert_eq!(credential.status, TwoFactorStatus::Active);
    assert!(credential.accepts_login());

    // confirm() is a one-way transition
    assert!(!credential.confirm());

    credential.revoke();
    assert_eq!(credential.status, TwoFactorStatus::Revoked);
    assert!(!credential.accepts_login());
}

#[test]
fn test_provision_stores_only_hashed_codes() {
    let auth = authenticator_with(TwoFactorPolicy {
        backup_code_count: 2,
        ..TwoFactorPolicy::default()
    });
    let (credential, provisioned) = auth
        .provision("user@example.com")
        .expect("Failed to provision");

    assert_eq!(credential.secret, provisioned.secret);
    assert_eq!(credential.backup_codes.len(), provisioned.backup_codes.len());
    for (hash, plaintext) in credential.backup_codes.iter().zip(&provisioned.backup_codes) {
        assert_ne!(hash, plaintext);
        assert!(hash.starts_with("$argon2"));
    }
}

#[test]
fn test_custom_policy_shapes_backup_codes() {
    let auth = authenticator_with(TwoFactorPolicy {
        backup_code_length: 10,
        backup_code_count: 4,
        ..TwoFactorPolicy::default()
    });
    let provisioned = auth
        .generate_secret("user@example.com")
        .expect("Failed to generate secret");

    assert_eq!(provisioned.backup_codes.len(), 4);
    assert!(provisioned.backup_codes.iter().all(|c| c.len() == 10));
}

#[test]
fn test_credential_roundtrips_through_serde() {
    let credential = TwoFactorCredential {
        secret: "JBSWY3DPEHPK3PXP".to_string(),
        backup_codes: vec!["$argon2id$fake".to_string()],
        status: TwoFactorStatus::Active,
    };

    let json = serde_json::to_string(&credential).expect("Failed to serialize");
    assert!(json.contains("\"status\":\"active\""));

    let decoded: TwoFactorCredential = serde_json::from_str(&json).expect("Failed to deserialize");
    assert_eq!(decoded.secret, credential.secret);
    assert_eq!(decoded.status, TwoFactorStatus::Active);
}
