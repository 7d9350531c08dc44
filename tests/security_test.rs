use bookstars::auth::{Claims, create_jwt, decode_jwt, hash_password, verify_password};
use bookstars::domain::{AccessDecision, DomainError, Role, STAFF_ROLES, authorize};

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_malformed_hash_is_an_error() {
    assert!(verify_password("anything", "not-a-phc-string").is_err());
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let token = create_jwt(7, "test_user", "moderator").expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "test_user");
    assert_eq!(claims.uid, 7);
    assert_eq!(claims.role, "moderator");
    assert!(claims.is_staff());
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let token = create_jwt(1, "reader", "reader").unwrap();
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[2] = "c2lnbmF0dXJl";
    let tampered = parts.join(".");

    assert!(decode_jwt(&tampered).is_err());
    assert!(decode_jwt("garbage").is_err());
}

#[tokio::test]
async fn test_require_role() {
    let reader = Claims {
        sub: "reader".to_string(),
        uid: 2,
        role: "reader".to_string(),
        exp: usize::MAX,
    };
    let err = reader.require_role(STAFF_ROLES).unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
    assert!(!reader.is_staff());

    let admin = Claims {
        sub: "admin".to_string(),
        uid: 1,
        role: "admin".to_string(),
        exp: usize::MAX,
    };
    assert!(admin.require_role(STAFF_ROLES).is_ok());
}

#[tokio::test]
async fn test_authorize_decision_carries_reason() {
    assert_eq!(authorize("author", &[Role::Author]), AccessDecision::Allow);

    match authorize("superuser", &[Role::Admin]) {
        AccessDecision::Deny { reason } => assert!(reason.contains("superuser")),
        AccessDecision::Allow => panic!("unknown roles must be denied"),
    }
}
