use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::attendance_lists::{
    AttendanceList, AttendanceListFilterParams, CreateAttendanceListDto,
    PaginatedAttendanceListsResponse, UpdateAttendanceListDto,
};

use crate::middleware::auth::{
    RequireAttendanceCreate, RequireAttendanceDelete, RequireAttendanceRead,
    RequireAttendanceUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AttendanceListService;

#[utoipa::path(
    post,
    path = "/api/attendance-lists",
    request_body = CreateAttendanceListDto,
    responses(
        (status = 201, description = "Attendance list created", body = AttendanceList),
        (status = 400, description = "Event does not exist"),
        (status = 422, description = "Validation error")
    ),
    tag = "Attendance Lists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_attendance_list(
    State(state): State<AppState>,
    _auth: RequireAttendanceCreate,
    ValidatedJson(dto): ValidatedJson<CreateAttendanceListDto>,
) -> Result<(StatusCode, Json<AttendanceList>), AppError> {
    let list = AttendanceListService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

#[utoipa::path(
    get,
    path = "/api/attendance-lists",
    params(AttendanceListFilterParams),
    responses(
        (status = 200, description = "Paginated attendance lists", body = PaginatedAttendanceListsResponse)
    ),
    tag = "Attendance Lists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_attendance_lists(
    State(state): State<AppState>,
    _auth: RequireAttendanceRead,
    Query(filters): Query<AttendanceListFilterParams>,
) -> Result<Json<PaginatedAttendanceListsResponse>, AppError> {
    let lists = AttendanceListService::list(&state.db, filters).await?;
    Ok(Json(lists))
}

#[utoipa::path(
    get,
    path = "/api/attendance-lists/{id}",
    params(("id" = Uuid, Path, description = "Attendance list ID")),
    responses(
        (status = 200, description = "Attendance list", body = AttendanceList),
        (status = 404, description = "Attendance list not found")
    ),
    tag = "Attendance Lists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_attendance_list(
    State(state): State<AppState>,
    _auth: RequireAttendanceRead,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceList>, AppError> {
    let list = AttendanceListService::get(&state.db, id).await?;
    Ok(Json(list))
}

#[utoipa::path(
    put,
    path = "/api/attendance-lists/{id}",
    params(("id" = Uuid, Path, description = "Attendance list ID")),
    request_body = UpdateAttendanceListDto,
    responses(
        (status = 200, description = "Attendance list updated", body = AttendanceList),
        (status = 400, description = "Event does not exist"),
        (status = 404, description = "Attendance list not found")
    ),
    tag = "Attendance Lists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_attendance_list(
    State(state): State<AppState>,
    _auth: RequireAttendanceUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAttendanceListDto>,
) -> Result<Json<AttendanceList>, AppError> {
    let list = AttendanceListService::update(&state.db, id, dto).await?;
    Ok(Json(list))
}

#[utoipa::path(
    delete,
    path = "/api/attendance-lists/{id}",
    params(("id" = Uuid, Path, description = "Attendance list ID")),
    responses(
        (status = 204, description = "Attendance list deleted"),
        (status = 404, description = "Attendance list not found")
    ),
    tag = "Attendance Lists",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_attendance_list(
    State(state): State<AppState>,
    _auth: RequireAttendanceDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AttendanceListService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
