mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{empty_request, login_as, send, setup_test_app, system_roles};
use sqlx::PgPool;

const BOUNDARY: &str = "scolaris-test-boundary";

fn multipart_request(
    method: &str,
    uri: &str,
    token: &str,
    file_name: &str,
    contents: &[u8],
    name: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(name) = name {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_document_lifecycle(pool: PgPool) {
    let (admin, token) = login_as(&pool, system_roles::ADMIN).await;
    let app = setup_test_app(pool.clone());

    let (status, document) = send(
        app.clone(),
        multipart_request(
            "POST",
            "/api/documents",
            &token,
            "Emploi du temps.pdf",
            b"%PDF-1.4 test",
            Some("Emploi du temps S1"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document["name"], "Emploi du temps S1");
    assert_eq!(document["document_type"], "pdf");
    assert_eq!(document["size"], 13);
    assert_eq!(document["user_id"], admin.id.to_string());
    let id = document["id"].as_str().unwrap().to_string();
    let file_url = document["file_url"].as_str().unwrap().to_string();
    assert!(file_url.starts_with("/uploads/documents/"));
    assert!(file_url.ends_with("Emploi_du_temps.pdf"));

    let (status, served) = send(app.clone(), empty_request("GET", &file_url, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, "%PDF-1.4 test");

    let (status, list) = send(app.clone(), empty_request("GET", "/api/documents", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], 1);

    let (status, _) = send(
        app.clone(),
        empty_request("DELETE", &format!("/api/documents/{}", id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(app.clone(), empty_request("GET", &file_url, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        app,
        empty_request("GET", &format!("/api/documents/{}", id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Document not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_document_name_defaults_to_file_name(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::TEACHER).await;

    let (status, document) = send(
        setup_test_app(pool),
        multipart_request("POST", "/api/documents", &token, "plan.docx", b"docx", None),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document["name"], "plan.docx");
    assert_eq!(document["document_type"], "docx");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_disallowed_extension_is_rejected(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        multipart_request("POST", "/api/documents", &token, "notes.xlsx", b"xlsx", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File type not allowed");

    let (status, resource) = send(
        setup_test_app(pool),
        multipart_request("POST", "/api/resources", &token, "notes.xlsx", b"xlsx", None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resource["resource_type"], "xlsx");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_requires_file(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/documents")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nVide\r\n--{BOUNDARY}--\r\n"
        )))
        .unwrap();

    let (status, body) = send(setup_test_app(pool), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_upload_resource(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::STUDENT).await;

    let (status, _) = send(
        setup_test_app(pool),
        multipart_request("POST", "/api/resources", &token, "cours.pdf", b"pdf", None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
