use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::course_modules::CourseModule;
use scolaris_models::niveaux::{
    CreateNiveauDto, Niveau, NiveauFilterParams, PaginatedNiveauxResponse, UpdateNiveauDto,
};

use crate::middleware::auth::{
    RequireNiveauCreate, RequireNiveauDelete, RequireNiveauRead, RequireNiveauUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::NiveauService;

#[utoipa::path(
    post,
    path = "/api/niveaux",
    request_body = CreateNiveauDto,
    responses(
        (status = 201, description = "Niveau created", body = Niveau),
        (status = 400, description = "Filiere does not exist"),
        (status = 422, description = "Validation error")
    ),
    tag = "Niveaux",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_niveau(
    State(state): State<AppState>,
    _auth: RequireNiveauCreate,
    ValidatedJson(dto): ValidatedJson<CreateNiveauDto>,
) -> Result<(StatusCode, Json<Niveau>), AppError> {
    let niveau = NiveauService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(niveau)))
}

#[utoipa::path(
    get,
    path = "/api/niveaux",
    params(NiveauFilterParams),
    responses(
        (status = 200, description = "Paginated niveaux", body = PaginatedNiveauxResponse)
    ),
    tag = "Niveaux",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_niveaux(
    State(state): State<AppState>,
    _auth: RequireNiveauRead,
    Query(filters): Query<NiveauFilterParams>,
) -> Result<Json<PaginatedNiveauxResponse>, AppError> {
    let niveaux = NiveauService::list(&state.db, filters).await?;
    Ok(Json(niveaux))
}

#[utoipa::path(
    get,
    path = "/api/niveaux/{id}",
    params(("id" = Uuid, Path, description = "Niveau ID")),
    responses(
        (status = 200, description = "Niveau", body = Niveau),
        (status = 404, description = "Niveau not found")
    ),
    tag = "Niveaux",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_niveau(
    State(state): State<AppState>,
    _auth: RequireNiveauRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Niveau>, AppError> {
    let niveau = NiveauService::get(&state.db, id).await?;
    Ok(Json(niveau))
}

#[utoipa::path(
    put,
    path = "/api/niveaux/{id}",
    params(("id" = Uuid, Path, description = "Niveau ID")),
    request_body = UpdateNiveauDto,
    responses(
        (status = 200, description = "Niveau updated", body = Niveau),
        (status = 400, description = "Filiere does not exist"),
        (status = 404, description = "Niveau not found")
    ),
    tag = "Niveaux",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_niveau(
    State(state): State<AppState>,
    _auth: RequireNiveauUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateNiveauDto>,
) -> Result<Json<Niveau>, AppError> {
    let niveau = NiveauService::update(&state.db, id, dto).await?;
    Ok(Json(niveau))
}

#[utoipa::path(
    delete,
    path = "/api/niveaux/{id}",
    params(("id" = Uuid, Path, description = "Niveau ID")),
    responses(
        (status = 204, description = "Niveau deleted"),
        (status = 404, description = "Niveau not found")
    ),
    tag = "Niveaux",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_niveau(
    State(state): State<AppState>,
    _auth: RequireNiveauDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    NiveauService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/niveaux/{id}/modules",
    params(("id" = Uuid, Path, description = "Niveau ID")),
    responses(
        (status = 200, description = "Modules of the niveau", body = Vec<CourseModule>),
        (status = 404, description = "Niveau not found")
    ),
    tag = "Niveaux",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_niveau_modules(
    State(state): State<AppState>,
    _auth: RequireNiveauRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CourseModule>>, AppError> {
    let modules = NiveauService::modules(&state.db, id).await?;
    Ok(Json(modules))
}
