use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::grades::{
    CreateGradeDto, Grade, GradeFilterParams, PaginatedGradesResponse, StudentAverageResponse,
    UpdateGradeDto,
};

use crate::middleware::auth::{
    RequireGradeCreate, RequireGradeDelete, RequireGradeRead, RequireGradeUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::GradeService;

#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade recorded", body = Grade),
        (status = 400, description = "Unknown reference"),
        (status = 422, description = "Grade out of range")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_grade(
    State(state): State<AppState>,
    _auth: RequireGradeCreate,
    ValidatedJson(dto): ValidatedJson<CreateGradeDto>,
) -> Result<(StatusCode, Json<Grade>), AppError> {
    let grade = GradeService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

#[utoipa::path(
    get,
    path = "/api/grades",
    params(GradeFilterParams),
    responses(
        (status = 200, description = "Paginated grades", body = PaginatedGradesResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_grades(
    State(state): State<AppState>,
    _auth: RequireGradeRead,
    Query(filters): Query<GradeFilterParams>,
) -> Result<Json<PaginatedGradesResponse>, AppError> {
    let grades = GradeService::list(&state.db, filters).await?;
    Ok(Json(grades))
}

#[utoipa::path(
    get,
    path = "/api/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade", body = Grade),
        (status = 404, description = "Grade not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_grade(
    State(state): State<AppState>,
    _auth: RequireGradeRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Grade>, AppError> {
    let grade = GradeService::get(&state.db, id).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    put,
    path = "/api/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Grade updated", body = Grade),
        (status = 404, description = "Grade not found"),
        (status = 422, description = "Grade out of range")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_grade(
    State(state): State<AppState>,
    _auth: RequireGradeUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<Grade>, AppError> {
    let grade = GradeService::update(&state.db, id, dto).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    delete,
    path = "/api/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    responses(
        (status = 204, description = "Grade deleted"),
        (status = 404, description = "Grade not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_grade(
    State(state): State<AppState>,
    _auth: RequireGradeDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    GradeService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/grades/student/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Grades of the student", body = Vec<Grade>)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_grades(
    State(state): State<AppState>,
    _auth: RequireGradeRead,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<Grade>>, AppError> {
    let grades = GradeService::for_student(&state.db, student_id).await?;
    Ok(Json(grades))
}

#[utoipa::path(
    get,
    path = "/api/grades/student/{student_id}/average",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Average grade of the student", body = StudentAverageResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_average(
    State(state): State<AppState>,
    _auth: RequireGradeRead,
    Path(student_id): Path<Uuid>,
) -> Result<Json<StudentAverageResponse>, AppError> {
    let average = GradeService::student_average(&state.db, student_id).await?;
    Ok(Json(average))
}

#[utoipa::path(
    get,
    path = "/api/grades/module/{module_id}",
    params(("module_id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Grades of the module", body = Vec<Grade>),
        (status = 404, description = "No grades found for this module")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_module_grades(
    State(state): State<AppState>,
    _auth: RequireGradeRead,
    Path(module_id): Path<Uuid>,
) -> Result<Json<Vec<Grade>>, AppError> {
    let grades = GradeService::for_module(&state.db, module_id).await?;
    Ok(Json(grades))
}
