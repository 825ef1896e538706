use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::course_modules::{
    CourseModule, CreateModuleDto, ModuleFilterParams, ModuleScheduleResponse,
    PaginatedModulesResponse, ScheduleQuery, UpdateModuleDto,
};

use crate::middleware::auth::{
    RequireModuleCreate, RequireModuleDelete, RequireModuleRead, RequireModuleUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::ModuleService;

#[utoipa::path(
    post,
    path = "/api/modules",
    request_body = CreateModuleDto,
    responses(
        (status = 201, description = "Module created", body = CourseModule),
        (status = 400, description = "Niveau or filiere does not exist"),
        (status = 409, description = "Title already in use"),
        (status = 422, description = "Validation error")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_module(
    State(state): State<AppState>,
    _auth: RequireModuleCreate,
    ValidatedJson(dto): ValidatedJson<CreateModuleDto>,
) -> Result<(StatusCode, Json<CourseModule>), AppError> {
    let module = ModuleService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    get,
    path = "/api/modules",
    params(ModuleFilterParams),
    responses(
        (status = 200, description = "Paginated modules", body = PaginatedModulesResponse)
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_modules(
    State(state): State<AppState>,
    _auth: RequireModuleRead,
    Query(filters): Query<ModuleFilterParams>,
) -> Result<Json<PaginatedModulesResponse>, AppError> {
    let modules = ModuleService::list(&state.db, filters).await?;
    Ok(Json(modules))
}

#[utoipa::path(
    get,
    path = "/api/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Module", body = CourseModule),
        (status = 404, description = "Module not found")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_module(
    State(state): State<AppState>,
    _auth: RequireModuleRead,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseModule>, AppError> {
    let module = ModuleService::get(&state.db, id).await?;
    Ok(Json(module))
}

#[utoipa::path(
    put,
    path = "/api/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = UpdateModuleDto,
    responses(
        (status = 200, description = "Module updated", body = CourseModule),
        (status = 404, description = "Module not found"),
        (status = 409, description = "Title already in use")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_module(
    State(state): State<AppState>,
    _auth: RequireModuleUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateModuleDto>,
) -> Result<Json<CourseModule>, AppError> {
    let module = ModuleService::update(&state.db, id, dto).await?;
    Ok(Json(module))
}

#[utoipa::path(
    delete,
    path = "/api/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 204, description = "Module deleted"),
        (status = 404, description = "Module not found")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_module(
    State(state): State<AppState>,
    _auth: RequireModuleDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ModuleService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/modules/{id}/schedule",
    params(("id" = Uuid, Path, description = "Module ID"), ScheduleQuery),
    responses(
        (status = 200, description = "Sessions of the module in the range", body = ModuleScheduleResponse),
        (status = 400, description = "Missing or inverted dates"),
        (status = 404, description = "No sessions in the range")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_module_schedule(
    State(state): State<AppState>,
    _auth: RequireModuleRead,
    Path(id): Path<Uuid>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ModuleScheduleResponse>, AppError> {
    let schedule = ModuleService::schedule(&state.db, id, query).await?;
    Ok(Json(schedule))
}
