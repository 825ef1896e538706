mod common;

use axum::http::StatusCode;
use common::{create_test_user, empty_request, json_request, login_as, send, setup_test_app, system_roles};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_permission_is_named(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::STUDENT).await;

    let (status, body) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/filieres",
            Some(&token),
            json!({ "name": "Genie Informatique" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Access denied. Missing required permission: filiere:create"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_without_role_has_no_permissions(pool: PgPool) {
    let user = create_test_user(&pool, "password123", None).await;
    let token =
        common::get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let (status, _) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/rooms", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_permission_change_applies_without_new_login(pool: PgPool) {
    let (_, admin_token) = login_as(&pool, system_roles::ADMIN).await;
    let (_, student_token) = login_as(&pool, system_roles::STUDENT).await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        empty_request("GET", "/api/grades", Some(&student_token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        json_request(
            "POST",
            "/api/permissions",
            Some(&admin_token),
            json!({
                "role_id": system_roles::STUDENT,
                "description": "Read grades",
                "permissions_allowed": ["grade:read"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/grades", Some(&student_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_permission_set_rejects_malformed_token(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;

    let (status, body) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/permissions",
            Some(&token),
            json!({
                "role_id": system_roles::TEACHER,
                "permissions_allowed": ["room"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid permission format: room");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_role_lifecycle(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;

    let (status, role) = send(
        setup_test_app(pool.clone()),
        json_request(
            "POST",
            "/api/roles",
            Some(&token),
            json!({ "role_name": "Surveillant" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let role_id = role["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        setup_test_app(pool.clone()),
        json_request(
            "POST",
            "/api/roles",
            Some(&token),
            json!({ "role_name": "Surveillant" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        empty_request("DELETE", &format!("/api/roles/{}", role_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        setup_test_app(pool),
        empty_request("GET", &format!("/api/roles/{}", role_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_system_role_cannot_be_deleted(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;

    let (status, body) = send(
        setup_test_app(pool),
        empty_request(
            "DELETE",
            &format!("/api/roles/{}", system_roles::TEACHER),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "System roles cannot be deleted");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_can_update_self_but_not_others(pool: PgPool) {
    let (student, token) = login_as(&pool, system_roles::STUDENT).await;
    let other = create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        json_request(
            "PUT",
            &format!("/api/users/{}", student.id),
            Some(&token),
            json!({ "phone_number": "0612345678" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone_number"], "0612345678");

    let (status, _) = send(
        setup_test_app(pool),
        json_request(
            "PUT",
            &format!("/api/users/{}", other.id),
            Some(&token),
            json!({ "phone_number": "0612345678" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_is_paginated(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;
    for _ in 0..3 {
        create_test_user(&pool, "password123", Some(system_roles::STUDENT)).await;
    }

    let (status, body) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/users?limit=2&page=1", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["total"], 4);
    assert_eq!(body["meta"]["limit"], 2);
}

async fn create_empty_set(pool: &PgPool, token: &str) -> String {
    let (status, body) = send(
        setup_test_app(pool.clone()),
        json_request(
            "POST",
            "/api/permissions",
            Some(token),
            json!({
                "role_id": system_roles::TEACHER,
                "description": "Extra rights",
                "permissions_allowed": []
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_permission_is_idempotent_and_remove_reports_missing(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;
    let set_id = create_empty_set(&pool, &token).await;
    let add_uri = format!("/api/permissions/{}/add-permission", set_id);
    let remove_uri = format!("/api/permissions/{}/remove-permission", set_id);

    for _ in 0..2 {
        let (status, body) = send(
            setup_test_app(pool.clone()),
            json_request("PATCH", &add_uri, Some(&token), json!({ "permission": "room:read" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["permissions_allowed"], json!(["room:read"]));
    }

    let (status, body) = send(
        setup_test_app(pool.clone()),
        json_request("PATCH", &remove_uri, Some(&token), json!({ "permission": "room:read" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissions_allowed"], json!([]));

    let (status, body) = send(
        setup_test_app(pool),
        json_request("PATCH", &remove_uri, Some(&token), json!({ "permission": "room:read" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Permission not found in set");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_adds_keep_every_token(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;
    let set_id = create_empty_set(&pool, &token).await;
    let uri = format!("/api/permissions/{}/add-permission", set_id);

    let tokens = [
        "room:create",
        "room:update",
        "event:create",
        "event:update",
        "grade:create",
        "grade:update",
        "user:read",
        "session:read",
    ];

    let app = setup_test_app(pool.clone());
    let mut handles = Vec::new();
    for permission in tokens {
        let app = app.clone();
        let request = json_request("PATCH", &uri, Some(&token), json!({ "permission": permission }));
        handles.push(tokio::spawn(async move { send(app, request).await }));
    }
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (status, body) = send(
        setup_test_app(pool),
        empty_request("GET", &format!("/api/permissions/{}", set_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut stored: Vec<String> = body["permissions_allowed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap().to_string())
        .collect();
    stored.sort();
    let mut expected: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    expected.sort();
    assert_eq!(stored, expected);
}
