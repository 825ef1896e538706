mod common;

use axum::http::StatusCode;
use common::{
    TestUser, cookie_request, create_test_user, empty_request, get_auth_token, json_request,
    send, send_with_cookie, setup_test_app, system_roles,
};
use serde_json::{Value, json};
use sqlx::PgPool;
use totp_rs::{Algorithm, Secret, TOTP};

fn current_code(secret: &str, email: &str) -> String {
    TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        Secret::Encoded(secret.to_string()).to_bytes().unwrap(),
        Some("Scolaris".to_string()),
        email.to_string(),
    )
    .unwrap()
    .generate_current()
    .unwrap()
}

/// Enrolls the user and returns the TOTP secret and the backup codes.
async fn enable_two_factor(
    app: &axum::Router,
    user: &TestUser,
    token: &str,
) -> (String, Vec<String>) {
    let (status, generated) = send(
        app.clone(),
        empty_request("POST", "/api/auth/2fa/generate", Some(token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "generate failed: {}", generated);
    assert!(
        generated["qr_code_url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert!(
        generated["otpauth_url"]
            .as_str()
            .unwrap()
            .starts_with("otpauth://totp/")
    );

    let secret = generated["secret"].as_str().unwrap().to_string();
    let backup_codes: Vec<String> = generated["backup_codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    assert_eq!(backup_codes.len(), 8);

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/2fa/verify-setup",
            Some(token),
            json!({ "token": current_code(&secret, &user.email) }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify-setup failed: {}", body);
    assert_eq!(body["message"], "2FA has been enabled");

    (secret, backup_codes)
}

/// Logs in with the password only, returning the body and the session cookie.
async fn password_login(app: &axum::Router, user: &TestUser) -> (Value, String) {
    let (status, body, cookie) = send_with_cookie(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": user.password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (body, cookie.unwrap())
}

async fn verify_login(app: &axum::Router, temp_token: &str, code: &str) -> (StatusCode, Value) {
    send(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/2fa/verify-login",
            None,
            json!({ "temp_token": temp_token, "token": code }),
        ),
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_two_factor_lifecycle(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;
    let token = get_auth_token(app.clone(), &user.email, &user.password).await;

    let (secret, backup_codes) = enable_two_factor(&app, &user, &token).await;

    let (status, body) = send(
        app.clone(),
        empty_request("GET", "/api/auth/2fa/status", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["backup_codes_remaining"], 8);

    // password alone now yields a temporary token
    let (login, _) = password_login(&app, &user).await;
    assert_eq!(login["requires_2fa"], true);
    assert!(login.get("access_token").is_none());
    let temp_token = login["temp_token"].as_str().unwrap().to_string();

    let (status, body) = send(
        app.clone(),
        empty_request("GET", "/api/auth/profile", Some(&temp_token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "2FA verification required");

    let (status, body) = verify_login(&app, &temp_token, &current_code(&secret, &user.email)).await;
    assert_eq!(status, StatusCode::OK, "totp login failed: {}", body);
    assert_eq!(body["user"]["email"], user.email);
    let access_token = body["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(
        app.clone(),
        empty_request("GET", "/api/auth/profile", Some(&access_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // backup codes are case-insensitive and single-use
    let (login, _) = password_login(&app, &user).await;
    let temp_token = login["temp_token"].as_str().unwrap().to_string();
    let backup = backup_codes[0].to_lowercase();

    let (status, body) = verify_login(&app, &temp_token, &backup).await;
    assert_eq!(status, StatusCode::OK, "backup code login failed: {}", body);
    assert!(body["access_token"].is_string());

    let (status, body) = verify_login(&app, &temp_token, &backup).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid 2FA token");

    let (status, body) = send(
        app.clone(),
        empty_request("GET", "/api/auth/2fa/status", Some(&access_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backup_codes_remaining"], 7);

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/2fa/disable",
            Some(&access_token),
            json!({ "password": "wrongpassword" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid password");

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/2fa/disable",
            Some(&access_token),
            json!({ "password": user.password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "2FA has been disabled");

    let (login, _) = password_login(&app, &user).await;
    assert!(login["access_token"].is_string());
    assert!(login.get("requires_2fa").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_verify_setup_rejects_wrong_code(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "password123", Some(system_roles::TEACHER)).await;
    let token = get_auth_token(app.clone(), &user.email, &user.password).await;

    let (status, _) = send(
        app.clone(),
        empty_request("POST", "/api/auth/2fa/generate", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/2fa/verify-setup",
            Some(&token),
            json!({ "token": "ABCDEFGHIJ" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid 2FA token");

    let (status, body) = send(
        app,
        empty_request("GET", "/api/auth/2fa/status", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pending_cookie_session_needs_second_factor(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;
    let token = get_auth_token(app.clone(), &user.email, &user.password).await;
    let (secret, _) = enable_two_factor(&app, &user, &token).await;

    let (login, cookie) = password_login(&app, &user).await;
    let temp_token = login["temp_token"].as_str().unwrap().to_string();

    let (status, body) = send(
        app.clone(),
        cookie_request("GET", "/api/auth/profile", &cookie, None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "2FA verification required");

    let (status, _, verified_cookie) = send_with_cookie(
        app.clone(),
        cookie_request(
            "POST",
            "/api/auth/2fa/verify-login",
            &cookie,
            Some(json!({
                "temp_token": temp_token,
                "token": current_code(&secret, &user.email)
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let verified_cookie = verified_cookie.expect("verify-login renews the session cookie");

    let (status, profile) = send(
        app,
        cookie_request("GET", "/api/auth/profile", &verified_cookie, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["email"], user.email);
}
