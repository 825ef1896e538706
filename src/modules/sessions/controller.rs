use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::sessions::{
    AttendanceSheetResponse, CreateSessionDto, PaginatedSessionsResponse, Session,
    SessionFilterParams, UpdateSessionDto,
};

use crate::middleware::auth::{
    RequireSessionCreate, RequireSessionDelete, RequireSessionRead, RequireSessionUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::SessionService;

#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionDto,
    responses(
        (status = 201, description = "Session scheduled", body = Session),
        (status = 400, description = "Invalid time span or unknown reference"),
        (status = 409, description = "Room or teacher already booked"),
        (status = 422, description = "Invalid body")
    ),
    tag = "Sessions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
    _auth: RequireSessionCreate,
    ValidatedJson(dto): ValidatedJson<CreateSessionDto>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = SessionService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/sessions",
    params(SessionFilterParams),
    responses(
        (status = 200, description = "Paginated sessions", body = PaginatedSessionsResponse)
    ),
    tag = "Sessions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    _auth: RequireSessionRead,
    Query(filters): Query<SessionFilterParams>,
) -> Result<Json<PaginatedSessionsResponse>, AppError> {
    let sessions = SessionService::list(&state.db, filters).await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session", body = Session),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    _auth: RequireSessionRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let session = SessionService::get(&state.db, id).await?;
    Ok(Json(session))
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = UpdateSessionDto,
    responses(
        (status = 200, description = "Session updated", body = Session),
        (status = 400, description = "Invalid time span or unknown reference"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Room or teacher already booked")
    ),
    tag = "Sessions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_session(
    State(state): State<AppState>,
    _auth: RequireSessionUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateSessionDto>,
) -> Result<Json<Session>, AppError> {
    let session = SessionService::update(&state.db, id, dto).await?;
    Ok(Json(session))
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    _auth: RequireSessionDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    SessionService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/attendance-sheet",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Students expected at the session", body = AttendanceSheetResponse),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_attendance_sheet(
    State(state): State<AppState>,
    _auth: RequireSessionRead,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceSheetResponse>, AppError> {
    let sheet = SessionService::attendance_sheet(&state.db, id).await?;
    Ok(Json(sheet))
}
