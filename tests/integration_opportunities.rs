mod common;

use axum::http::StatusCode;
use common::{empty_request, json_request, login_as, send, setup_test_app, system_roles};
use serde_json::{Value, json};
use sqlx::PgPool;

fn opportunity(title: &str, kind: &str, company: &str) -> Value {
    json!({
        "title": title,
        "opportunity_type": kind,
        "description": "Developpement d'une application web",
        "company": company,
        "location": "Casablanca",
        "profile": "Etudiant en 2e annee"
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_any_user_can_browse_opportunities(pool: PgPool) {
    let (_, admin_token) = login_as(&pool, system_roles::ADMIN).await;
    let (_, student_token) = login_as(&pool, system_roles::STUDENT).await;

    for (title, kind, company) in [
        ("Stage PFE", "stage", "Atlas Tech"),
        ("Developpeur junior", "offre d'emploi", "Sahara Soft"),
    ] {
        let (status, _) = send(
            setup_test_app(pool.clone()),
            json_request(
                "POST",
                "/api/opportunities",
                Some(&admin_token),
                opportunity(title, kind, company),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        setup_test_app(pool.clone()),
        empty_request("GET", "/api/opportunities", Some(&student_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (status, body) = send(
        setup_test_app(pool),
        empty_request(
            "GET",
            "/api/opportunities?opportunity_type=stage",
            Some(&student_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["company"], "Atlas Tech");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_opportunity_type(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::ADMIN).await;

    let (status, body) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/opportunities",
            Some(&token),
            opportunity("Alternance", "alternance", "Atlas Tech"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid opportunity type: alternance. Expected 'stage' or 'offre d'emploi'"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_publish_opportunity(pool: PgPool) {
    let (_, token) = login_as(&pool, system_roles::STUDENT).await;

    let (status, _) = send(
        setup_test_app(pool),
        json_request(
            "POST",
            "/api/opportunities",
            Some(&token),
            opportunity("Stage", "stage", "Atlas Tech"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_opportunities_require_authentication(pool: PgPool) {
    let (status, _) = send(
        setup_test_app(pool),
        empty_request("GET", "/api/opportunities", None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
