use scolaris::scolaris_auth::claims::TokenPurpose;
use scolaris::scolaris_auth::jwt::{
    create_access_token, create_purpose_token, create_refresh_token, create_two_factor_token,
    verify_purpose_token, verify_token,
};
use scolaris::scolaris_config::JwtConfig;
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
    }
}

#[test]
fn test_access_token_without_role() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let token =
        create_access_token(user_id, "new@scolaris.ma", None, None, vec![], &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, user_id.to_string());
    assert!(claims.role_id.is_none());
    assert!(claims.permissions.is_empty());
}

#[test]
fn test_refresh_token_is_not_an_access_token() {
    let jwt_config = get_test_jwt_config();
    let (token, claims) = create_refresh_token(Uuid::new_v4(), "a@scolaris.ma", &jwt_config).unwrap();

    assert_eq!(claims.purpose, TokenPurpose::Refresh);
    assert_eq!(claims.exp - claims.iat, 604800);
    assert!(verify_token(&token, &jwt_config).is_err());
    assert!(verify_purpose_token(&token, TokenPurpose::Refresh, &jwt_config).is_ok());
}

#[test]
fn test_two_factor_token_asks_for_second_step() {
    let jwt_config = get_test_jwt_config();
    let token = create_two_factor_token(Uuid::new_v4(), "a@scolaris.ma", &jwt_config).unwrap();

    let err = verify_token(&token, &jwt_config).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(err.error.to_string(), "2FA verification required");
}

#[test]
fn test_email_links_cannot_be_swapped() {
    let jwt_config = get_test_jwt_config();
    let (verification, _) = create_purpose_token(
        Uuid::new_v4(),
        "a@scolaris.ma",
        TokenPurpose::EmailVerification,
        3600,
        &jwt_config,
    )
    .unwrap();

    assert!(verify_purpose_token(&verification, TokenPurpose::EmailVerification, &jwt_config).is_ok());

    let err = verify_purpose_token(&verification, TokenPurpose::PasswordReset, &jwt_config).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let jwt_config = get_test_jwt_config();
    let other = JwtConfig {
        secret: "another_secret_key_for_testing".to_string(),
        ..get_test_jwt_config()
    };

    let token = create_access_token(Uuid::new_v4(), "a@scolaris.ma", None, None, vec![], &other).unwrap();

    assert!(verify_token(&token, &jwt_config).is_err());
}
