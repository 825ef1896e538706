#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use scolaris::router::init_router;
use scolaris::state::AppState;
use scolaris_core::hash_password;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub use scolaris_models::roles::system_roles;

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role_id: Option<Uuid>,
}

pub fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    init_router(AppState::for_tests(pool))
}

pub fn generate_unique_email() -> String {
    format!("test-{}@scolaris.local", Uuid::new_v4())
}

/// Inserts an active user holding `role_id`, bypassing registration.
pub async fn create_test_user(pool: &PgPool, password: &str, role_id: Option<Uuid>) -> TestUser {
    create_test_user_in_groupe(pool, password, role_id, None).await
}

pub async fn create_test_user_in_groupe(
    pool: &PgPool,
    password: &str,
    role_id: Option<Uuid>,
    groupe_id: Option<Uuid>,
) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO users (first_name, last_name, email, password, role_id, groupe_id, email_verified)
           VALUES ('Test', 'User', $1, $2, $3, $4, TRUE)
           RETURNING id"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role_id)
    .bind(groupe_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: password.to_string(),
        role_id,
    }
}

pub async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request("POST", "/api/auth/login", None, json!({
            "email": email,
            "password": password
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

/// Creates a user with `role_id` and returns it with an access token.
pub async fn login_as(pool: &PgPool, role_id: Uuid) -> (TestUser, String) {
    let user = create_test_user(pool, "password123", Some(role_id)).await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;
    (user, token)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends the request and decodes the body as JSON (`Null` when empty).
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// Like [`send`], also returning the `name=value` part of any session cookie set.
pub async fn send_with_cookie(
    app: axum::Router,
    request: Request<Body>,
) -> (StatusCode, Value, Option<String>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body, cookie)
}

/// A request authenticated only by a session cookie.
pub fn cookie_request(method: &str, uri: &str, cookie: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookie);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct TestHierarchy {
    pub filiere_id: Uuid,
    pub niveau_id: Uuid,
    pub groupe_id: Uuid,
}

/// One filiere with one niveau and one groupe.
pub async fn create_test_hierarchy(pool: &PgPool) -> TestHierarchy {
    let filiere_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO filieres (name, description) VALUES ($1, 'Test filiere') RETURNING id",
    )
    .bind(format!("Filiere {}", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .unwrap();

    let niveau_id = sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO niveaux (name, filiere_id, academic_year, credits_required)
           VALUES ('1A', $1, '2025-2026', 60) RETURNING id"#,
    )
    .bind(filiere_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let groupe_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO groupes (groupe_name, niveau_id) VALUES ('G1', $1) RETURNING id",
    )
    .bind(niveau_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestHierarchy {
        filiere_id,
        niveau_id,
        groupe_id,
    }
}

pub async fn create_test_module(
    pool: &PgPool,
    hierarchy: &TestHierarchy,
    title: &str,
    credits: i32,
    credit_required: i32,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO modules (title, credits, credit_required, niveau_id, filiere_id)
           VALUES ($1, $2, $3, $4, $5) RETURNING id"#,
    )
    .bind(title)
    .bind(credits)
    .bind(credit_required)
    .bind(hierarchy.niveau_id)
    .bind(hierarchy.filiere_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_room(pool: &PgPool, room_number: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO rooms (room_number, capacity, room_type, facility)
           VALUES ($1, 30, 'Salle de cours', 'Projecteur') RETURNING id"#,
    )
    .bind(room_number)
    .fetch_one(pool)
    .await
    .unwrap()
}
