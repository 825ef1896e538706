mod common;

use axum::http::StatusCode;
use common::{
    TestHierarchy, create_test_hierarchy, create_test_module, create_test_room, create_test_user,
    empty_request, json_request, login_as, send, setup_test_app, system_roles,
};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

struct Fixture {
    token: String,
    hierarchy: TestHierarchy,
    teacher_id: Uuid,
    room_id: Uuid,
    module_id: Uuid,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let (_, token) = login_as(pool, system_roles::ADMIN).await;
    let hierarchy = create_test_hierarchy(pool).await;
    let teacher = create_test_user(pool, "password123", Some(system_roles::TEACHER)).await;
    let room_id = create_test_room(pool, "A101").await;
    let module_id = create_test_module(pool, &hierarchy, "Algorithmique", 4, 2).await;

    Fixture {
        token,
        hierarchy,
        teacher_id: teacher.id,
        room_id,
        module_id,
    }
}

fn session_body(f: &Fixture, teacher_id: Uuid, room_id: Uuid, start: &str, end: &str) -> Value {
    json!({
        "date": "2025-10-06",
        "groupe_id": f.hierarchy.groupe_id,
        "teacher_id": teacher_id,
        "room_id": room_id,
        "module_id": f.module_id,
        "start_date_time": start,
        "end_date_time": end,
        "session_type": "normal"
    })
}

async fn create_session(pool: &PgPool, f: &Fixture, body: Value) -> (StatusCode, Value) {
    send(
        setup_test_app(pool.clone()),
        json_request("POST", "/api/sessions", Some(&f.token), body),
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_session(pool: PgPool) {
    let f = fixture(&pool).await;

    let (status, body) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["session_type"], "normal");
    assert_eq!(body["room_id"], f.room_id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_end_before_start_is_rejected(pool: PgPool) {
    let f = fixture(&pool).await;

    let (status, _) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T10:00:00Z",
            "2025-10-06T08:00:00Z",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_room_double_booking_is_rejected(pool: PgPool) {
    let f = fixture(&pool).await;
    let other_teacher = create_test_user(&pool, "password123", Some(system_roles::TEACHER)).await;

    let (status, _) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            other_teacher.id,
            f.room_id,
            "2025-10-06T09:00:00Z",
            "2025-10-06T11:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Room is not available for the selected time range."
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_double_booking_is_rejected(pool: PgPool) {
    let f = fixture(&pool).await;
    let other_room = create_test_room(&pool, "B202").await;

    create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;

    let (status, body) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            other_room,
            "2025-10-06T09:30:00Z",
            "2025-10-06T10:30:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Teacher is not available during the selected time range."
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_back_to_back_sessions_do_not_conflict(pool: PgPool) {
    let f = fixture(&pool).await;

    let (status, _) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T10:00:00Z",
            "2025-10-06T12:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_session_can_be_moved_within_its_own_slot(pool: PgPool) {
    let f = fixture(&pool).await;

    let (_, session) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;
    let id = session["id"].as_str().unwrap();

    let (status, body) = send(
        setup_test_app(pool),
        json_request(
            "PUT",
            &format!("/api/sessions/{}", id),
            Some(&f.token),
            json!({ "end_date_time": "2025-10-06T09:30:00Z", "session_type": "exam" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_type"], "exam");
    assert_eq!(body["room_id"], f.room_id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_session_type_is_required(pool: PgPool) {
    let f = fixture(&pool).await;

    let mut body = session_body(
        &f,
        f.teacher_id,
        f.room_id,
        "2025-10-06T08:00:00Z",
        "2025-10-06T10:00:00Z",
    );
    body.as_object_mut().unwrap().remove("session_type");

    let (status, body) = create_session(&pool, &f, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "session_type is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_session_cannot_be_moved_onto_a_booked_room(pool: PgPool) {
    let f = fixture(&pool).await;
    let other_teacher = create_test_user(&pool, "password123", Some(system_roles::TEACHER)).await;

    let (status, _) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, afternoon) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            other_teacher.id,
            f.room_id,
            "2025-10-06T14:00:00Z",
            "2025-10-06T16:00:00Z",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        setup_test_app(pool),
        json_request(
            "PUT",
            &format!("/api/sessions/{}", afternoon["id"].as_str().unwrap()),
            Some(&f.token),
            json!({
                "start_date_time": "2025-10-06T09:00:00Z",
                "end_date_time": "2025-10-06T11:00:00Z"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Room is not available for the selected time range.");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_room_availability_reports_conflicts(pool: PgPool) {
    let f = fixture(&pool).await;

    create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;

    let (status, busy) = send(
        setup_test_app(pool.clone()),
        empty_request(
            "GET",
            &format!(
                "/api/rooms/{}/availability?start=2025-10-06T09:00:00Z&end=2025-10-06T09:30:00Z",
                f.room_id
            ),
            Some(&f.token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(busy["available"], false);
    assert_eq!(busy["conflicts"].as_array().unwrap().len(), 1);

    let (status, free) = send(
        setup_test_app(pool.clone()),
        empty_request(
            "GET",
            &format!(
                "/api/rooms/{}/availability?start=2025-10-06T10:00:00Z&end=2025-10-06T11:00:00Z",
                f.room_id
            ),
            Some(&f.token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(free["available"], true);

    let (status, body) = send(
        setup_test_app(pool),
        empty_request(
            "GET",
            &format!("/api/rooms/{}/availability", f.room_id),
            Some(&f.token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "start and end are required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_sheet_lists_groupe(pool: PgPool) {
    let f = fixture(&pool).await;
    common::create_test_user_in_groupe(
        &pool,
        "password123",
        Some(system_roles::STUDENT),
        Some(f.hierarchy.groupe_id),
    )
    .await;

    let (_, session) = create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;

    let (status, body) = send(
        setup_test_app(pool),
        empty_request(
            "GET",
            &format!(
                "/api/sessions/{}/attendance-sheet",
                session["id"].as_str().unwrap()
            ),
            Some(&f.token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["id"], session["id"]);
    assert_eq!(body["students"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_module_schedule_returns_sessions(pool: PgPool) {
    let f = fixture(&pool).await;

    create_session(
        &pool,
        &f,
        session_body(
            &f,
            f.teacher_id,
            f.room_id,
            "2025-10-06T08:00:00Z",
            "2025-10-06T10:00:00Z",
        ),
    )
    .await;

    let (status, body) = send(
        setup_test_app(pool),
        empty_request(
            "GET",
            &format!(
                "/api/modules/{}/schedule?start_date=2025-10-01&end_date=2025-10-31",
                f.module_id
            ),
            Some(&f.token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_sessions"], 1);
}
