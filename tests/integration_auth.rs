mod common;

use axum::http::StatusCode;
use common::{
    cookie_request, create_test_user, empty_request, generate_unique_email, get_auth_token,
    json_request, send, send_with_cookie, setup_test_app, system_roles,
};
use scolaris::modules::auth::service::AuthService;
use scolaris::scolaris_auth::TokenPurpose;
use scolaris::scolaris_config::JwtConfig;
use scolaris::scolaris_config::jwt::{EMAIL_VERIFICATION_EXPIRY, PASSWORD_RESET_EXPIRY};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_register_assigns_student_role(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let email = generate_unique_email();

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "first_name": "Salma",
                "last_name": "Benali",
                "email": email,
                "password": "password123"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email);
    assert!(body.get("password").is_none());

    let role_id: Option<uuid::Uuid> =
        sqlx::query_scalar("SELECT role_id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(role_id, Some(system_roles::STUDENT));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email(pool: PgPool) {
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "first_name": "Other",
                "last_name": "Person",
                "email": user.email,
                "password": "password123"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This email is already in use");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_rejects_short_password(pool: PgPool) {
    let (status, _) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "first_name": "Salma",
                "last_name": "Benali",
                "email": generate_unique_email(),
                "password": "short"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_with_wrong_password(pool: PgPool) {
    let user = create_test_user(&pool, "password123", Some(system_roles::TEACHER)).await;

    let (status, _) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": "wrongpassword" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_returns_role_and_permissions(pool: PgPool) {
    let user = create_test_user(&pool, "password123", Some(system_roles::TEACHER)).await;

    let (status, body) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": user.password }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["role"], "Teacher");
    let permissions: Vec<&str> = body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p.as_str())
        .collect();
    assert!(permissions.contains(&"session:create"));
    assert!(!permissions.contains(&"role:delete"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_requires_token(pool: PgPool) {
    let (status, body) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/auth/profile", None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_rejects_garbage_token(pool: PgPool) {
    let (status, _) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/auth/profile", Some("not-a-jwt")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_token_is_single_use(pool: PgPool) {
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;

    let (_, login) = send(
        setup_test_app(pool.clone()),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": user.password }),
        ),
    )
    .await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let (status, rotated) = send(
        setup_test_app(pool.clone()),
        json_request(
            "POST",
            "/api/auth/refresh",
            None,
            json!({ "refresh_token": refresh_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(rotated["access_token"].is_string());
    assert_ne!(rotated["refresh_token"], login["refresh_token"]);

    let (status, _) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/auth/refresh",
            None,
            json!({ "refresh_token": refresh_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_revokes_access_token(pool: PgPool) {
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let (status, profile) = send(
        setup_test_app(pool.clone()),
        empty_request("GET", "/api/auth/profile", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["email"], user.email);
    assert_eq!(profile["role"], "Student");

    let (status, _) = send(
        setup_test_app(pool.clone()),
        empty_request("POST", "/api/auth/logout", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/auth/profile", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has been revoked");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_account_is_forbidden(pool: PgPool) {
    let user = create_test_user(&pool, "password123", Some(system_roles::TEACHER)).await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/auth/profile", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is deactivated");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_forgot_password_does_not_reveal_unknown_email(pool: PgPool) {
    let (status, _) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            json!({ "email": generate_unique_email() }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_verification_link_works_once(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;
    sqlx::query("UPDATE users SET email_verified = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let token = AuthService::issue_action_token(
        &pool,
        user.id,
        &user.email,
        TokenPurpose::EmailVerification,
        EMAIL_VERIFICATION_EXPIRY,
        &JwtConfig::from_env(),
    )
    .await
    .unwrap();
    let uri = format!("/api/auth/verify/{}", token);

    let (status, body) = send(app.clone(), empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email verified successfully");

    let verified: bool = sqlx::query_scalar("SELECT email_verified FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(verified);

    let (status, body) = send(app, empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired verification token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reset_link_works_once(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;

    let token = AuthService::issue_action_token(
        &pool,
        user.id,
        &user.email,
        TokenPurpose::PasswordReset,
        PASSWORD_RESET_EXPIRY,
        &JwtConfig::from_env(),
    )
    .await
    .unwrap();
    let uri = format!("/api/auth/reset-password/{}", token);

    let (status, body) = send(
        app.clone(),
        json_request("POST", &uri, None, json!({ "new_password": "newpassword456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password has been reset successfully");

    let (status, _) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": "newpassword456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        json_request("POST", &uri, None, json!({ "new_password": "anotherpass789" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired reset token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_verification_token_cannot_reset_password(pool: PgPool) {
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;
    let token = AuthService::issue_action_token(
        &pool,
        user.id,
        &user.email,
        TokenPurpose::EmailVerification,
        EMAIL_VERIFICATION_EXPIRY,
        &JwtConfig::from_env(),
    )
    .await
    .unwrap();

    let (status, body) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            &format!("/api/auth/reset-password/{}", token),
            None,
            json!({ "new_password": "newpassword456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired reset token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_opens_cookie_session(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;

    let (status, _, cookie) = send_with_cookie(
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
    let cookie = cookie.expect("login sets a session cookie");
    assert!(cookie.starts_with("scolaris.sid="));

    let (status, profile) = send(
        app.clone(),
        cookie_request("GET", "/api/auth/profile", &cookie, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["email"], user.email);
    assert_eq!(profile["role"], "Student");

    let (status, body) = send(
        app.clone(),
        cookie_request("POST", "/api/auth/logout", &cookie, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, body) = send(app, cookie_request("GET", "/api/auth/profile", &cookie, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bearer_token_wins_over_cookie(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let student = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;
    let teacher = create_test_user(&pool, "password123", Some(system_roles::TEACHER)).await;

    let (_, _, cookie) = send_with_cookie(
        app.clone(),
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": student.email, "password": student.password }),
        ),
    )
    .await;
    let cookie = cookie.unwrap();
    let token = get_auth_token(app.clone(), &teacher.email, &teacher.password).await;

    let mut request = cookie_request("GET", "/api/auth/profile", &cookie, None);
    request.headers_mut().insert(
        "authorization",
        format!("Bearer {}", token).parse().unwrap(),
    );
    let (status, profile) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["email"], teacher.email);
}
