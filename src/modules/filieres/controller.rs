use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::course_modules::CourseModule;
use scolaris_models::filieres::{
    CreateFiliereDto, Filiere, FiliereFilterParams, PaginatedFilieresResponse, UpdateFiliereDto,
};

use crate::middleware::auth::{
    RequireFiliereCreate, RequireFiliereDelete, RequireFiliereRead, RequireFiliereUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::FiliereService;

#[utoipa::path(
    post,
    path = "/api/filieres",
    request_body = CreateFiliereDto,
    responses(
        (status = 201, description = "Filiere created", body = Filiere),
        (status = 409, description = "A filiere with this name already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Filieres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_filiere(
    State(state): State<AppState>,
    _auth: RequireFiliereCreate,
    ValidatedJson(dto): ValidatedJson<CreateFiliereDto>,
) -> Result<(StatusCode, Json<Filiere>), AppError> {
    let filiere = FiliereService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(filiere)))
}

#[utoipa::path(
    get,
    path = "/api/filieres",
    params(FiliereFilterParams),
    responses(
        (status = 200, description = "Paginated filieres", body = PaginatedFilieresResponse)
    ),
    tag = "Filieres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_filieres(
    State(state): State<AppState>,
    _auth: RequireFiliereRead,
    Query(filters): Query<FiliereFilterParams>,
) -> Result<Json<PaginatedFilieresResponse>, AppError> {
    let filieres = FiliereService::list(&state.db, filters).await?;
    Ok(Json(filieres))
}

#[utoipa::path(
    get,
    path = "/api/filieres/{id}",
    params(("id" = Uuid, Path, description = "Filiere ID")),
    responses(
        (status = 200, description = "Filiere", body = Filiere),
        (status = 404, description = "Filiere not found")
    ),
    tag = "Filieres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_filiere(
    State(state): State<AppState>,
    _auth: RequireFiliereRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Filiere>, AppError> {
    let filiere = FiliereService::get(&state.db, id).await?;
    Ok(Json(filiere))
}

#[utoipa::path(
    put,
    path = "/api/filieres/{id}",
    params(("id" = Uuid, Path, description = "Filiere ID")),
    request_body = UpdateFiliereDto,
    responses(
        (status = 200, description = "Filiere updated", body = Filiere),
        (status = 404, description = "Filiere not found"),
        (status = 409, description = "A filiere with this name already exists")
    ),
    tag = "Filieres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_filiere(
    State(state): State<AppState>,
    _auth: RequireFiliereUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateFiliereDto>,
) -> Result<Json<Filiere>, AppError> {
    let filiere = FiliereService::update(&state.db, id, dto).await?;
    Ok(Json(filiere))
}

#[utoipa::path(
    delete,
    path = "/api/filieres/{id}",
    params(("id" = Uuid, Path, description = "Filiere ID")),
    responses(
        (status = 204, description = "Filiere deleted"),
        (status = 404, description = "Filiere not found")
    ),
    tag = "Filieres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_filiere(
    State(state): State<AppState>,
    _auth: RequireFiliereDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    FiliereService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/filieres/{id}/modules",
    params(("id" = Uuid, Path, description = "Filiere ID")),
    responses(
        (status = 200, description = "Modules of the filiere", body = Vec<CourseModule>),
        (status = 404, description = "Filiere not found")
    ),
    tag = "Filieres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_filiere_modules(
    State(state): State<AppState>,
    _auth: RequireFiliereRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CourseModule>>, AppError> {
    let modules = FiliereService::modules(&state.db, id).await?;
    Ok(Json(modules))
}
