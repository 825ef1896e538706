mod common;

use axum::http::StatusCode;
use common::{empty_request, send, setup_test_app};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_health_reports_database(pool: PgPool) {
    let (status, body) = send(setup_test_app(pool), empty_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health_reports_closed_pool(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    pool.close().await;

    let (status, body) = send(app, empty_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "down");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_openapi_document_is_served(pool: PgPool) {
    let (status, body) = send(
        setup_test_app(pool),
        empty_request("GET", "/api-docs/openapi.json", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Scolaris API");
    assert!(body["paths"]["/api/bulletins/{student_id}"].is_object());
}
