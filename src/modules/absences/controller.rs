use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::absences::{
    Absence, AbsenceCountsResponse, AbsenceFilterParams, AbsenceWithStudent, BulkAbsenceDto,
    PaginatedAbsencesResponse, UpdateAbsenceDto,
};
use scolaris_models::users::UserSummary;

use crate::middleware::auth::{
    RequireAbsenceCreate, RequireAbsenceDelete, RequireAbsenceRead, RequireAbsenceUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AbsenceService;

#[utoipa::path(
    get,
    path = "/api/absences",
    params(AbsenceFilterParams),
    responses(
        (status = 200, description = "Paginated absences", body = PaginatedAbsencesResponse),
        (status = 400, description = "Invalid status filter")
    ),
    tag = "Absences",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_absences(
    State(state): State<AppState>,
    _auth: RequireAbsenceRead,
    Query(filters): Query<AbsenceFilterParams>,
) -> Result<Json<PaginatedAbsencesResponse>, AppError> {
    let absences = AbsenceService::list(&state.db, filters).await?;
    Ok(Json(absences))
}

#[utoipa::path(
    get,
    path = "/api/absences/groupe/{groupe_id}/students",
    params(("groupe_id" = Uuid, Path, description = "Groupe ID")),
    responses(
        (status = 200, description = "Students of the groupe", body = Vec<UserSummary>),
        (status = 404, description = "Groupe not found")
    ),
    tag = "Absences",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_groupe_students(
    State(state): State<AppState>,
    _auth: RequireAbsenceRead,
    Path(groupe_id): Path<Uuid>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let students = AbsenceService::groupe_students(&state.db, groupe_id).await?;
    Ok(Json(students))
}

#[utoipa::path(
    post,
    path = "/api/absences/bulk",
    request_body = BulkAbsenceDto,
    responses(
        (status = 201, description = "Roll call recorded", body = Vec<Absence>),
        (status = 400, description = "Invalid status or empty groupe"),
        (status = 404, description = "Groupe not found")
    ),
    tag = "Absences",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn bulk_create_absences(
    State(state): State<AppState>,
    _auth: RequireAbsenceCreate,
    ValidatedJson(dto): ValidatedJson<BulkAbsenceDto>,
) -> Result<(StatusCode, Json<Vec<Absence>>), AppError> {
    let absences = AbsenceService::bulk_create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(absences)))
}

#[utoipa::path(
    get,
    path = "/api/absences/{id}",
    params(("id" = Uuid, Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence with the student's identity", body = AbsenceWithStudent),
        (status = 404, description = "Absence not found")
    ),
    tag = "Absences",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_absence(
    State(state): State<AppState>,
    _auth: RequireAbsenceRead,
    Path(id): Path<Uuid>,
) -> Result<Json<AbsenceWithStudent>, AppError> {
    let absence = AbsenceService::get(&state.db, id).await?;
    Ok(Json(absence))
}

#[utoipa::path(
    put,
    path = "/api/absences/{id}",
    params(("id" = Uuid, Path, description = "Absence ID")),
    request_body = UpdateAbsenceDto,
    responses(
        (status = 200, description = "Absence updated", body = Absence),
        (status = 400, description = "Nothing to update or invalid status"),
        (status = 404, description = "Absence not found")
    ),
    tag = "Absences",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_absence(
    State(state): State<AppState>,
    _auth: RequireAbsenceUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAbsenceDto>,
) -> Result<Json<Absence>, AppError> {
    let absence = AbsenceService::update(&state.db, id, dto).await?;
    Ok(Json(absence))
}

#[utoipa::path(
    get,
    path = "/api/absences/student/{student_id}/counts",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Absence counts per status", body = AbsenceCountsResponse)
    ),
    tag = "Absences",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_counts(
    State(state): State<AppState>,
    _auth: RequireAbsenceRead,
    Path(student_id): Path<Uuid>,
) -> Result<Json<AbsenceCountsResponse>, AppError> {
    let counts = AbsenceService::counts(&state.db, student_id).await?;
    Ok(Json(counts))
}

#[utoipa::path(
    delete,
    path = "/api/absences/{id}",
    params(("id" = Uuid, Path, description = "Absence ID")),
    responses(
        (status = 204, description = "Absence deleted"),
        (status = 404, description = "Absence not found")
    ),
    tag = "Absences",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_absence(
    State(state): State<AppState>,
    _auth: RequireAbsenceDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AbsenceService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
