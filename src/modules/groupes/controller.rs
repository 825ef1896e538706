use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::groupes::{
    CreateGroupeDto, Groupe, GroupeFilterParams, GroupeMembersResponse, PaginatedGroupesResponse,
    UpdateGroupeDto,
};

use crate::middleware::auth::{
    RequireGroupeCreate, RequireGroupeDelete, RequireGroupeRead, RequireGroupeUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::GroupeService;

#[utoipa::path(
    post,
    path = "/api/groupes",
    request_body = CreateGroupeDto,
    responses(
        (status = 201, description = "Groupe created", body = Groupe),
        (status = 400, description = "Niveau does not exist"),
        (status = 422, description = "Validation error")
    ),
    tag = "Groupes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_groupe(
    State(state): State<AppState>,
    _auth: RequireGroupeCreate,
    ValidatedJson(dto): ValidatedJson<CreateGroupeDto>,
) -> Result<(StatusCode, Json<Groupe>), AppError> {
    let groupe = GroupeService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(groupe)))
}

#[utoipa::path(
    get,
    path = "/api/groupes",
    params(GroupeFilterParams),
    responses(
        (status = 200, description = "Paginated groupes", body = PaginatedGroupesResponse)
    ),
    tag = "Groupes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_groupes(
    State(state): State<AppState>,
    _auth: RequireGroupeRead,
    Query(filters): Query<GroupeFilterParams>,
) -> Result<Json<PaginatedGroupesResponse>, AppError> {
    let groupes = GroupeService::list(&state.db, filters).await?;
    Ok(Json(groupes))
}

#[utoipa::path(
    get,
    path = "/api/groupes/{id}",
    params(("id" = Uuid, Path, description = "Groupe ID")),
    responses(
        (status = 200, description = "Groupe", body = Groupe),
        (status = 404, description = "Groupe not found")
    ),
    tag = "Groupes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_groupe(
    State(state): State<AppState>,
    _auth: RequireGroupeRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Groupe>, AppError> {
    let groupe = GroupeService::get(&state.db, id).await?;
    Ok(Json(groupe))
}

#[utoipa::path(
    put,
    path = "/api/groupes/{id}",
    params(("id" = Uuid, Path, description = "Groupe ID")),
    request_body = UpdateGroupeDto,
    responses(
        (status = 200, description = "Groupe updated", body = Groupe),
        (status = 400, description = "Niveau does not exist"),
        (status = 404, description = "Groupe not found")
    ),
    tag = "Groupes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_groupe(
    State(state): State<AppState>,
    _auth: RequireGroupeUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGroupeDto>,
) -> Result<Json<Groupe>, AppError> {
    let groupe = GroupeService::update(&state.db, id, dto).await?;
    Ok(Json(groupe))
}

#[utoipa::path(
    delete,
    path = "/api/groupes/{id}",
    params(("id" = Uuid, Path, description = "Groupe ID")),
    responses(
        (status = 204, description = "Groupe deleted"),
        (status = 404, description = "Groupe not found")
    ),
    tag = "Groupes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_groupe(
    State(state): State<AppState>,
    _auth: RequireGroupeDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    GroupeService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/groupes/{id}/users",
    params(("id" = Uuid, Path, description = "Groupe ID")),
    responses(
        (status = 200, description = "Members of the groupe", body = GroupeMembersResponse),
        (status = 404, description = "Groupe not found")
    ),
    tag = "Groupes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_groupe_users(
    State(state): State<AppState>,
    _auth: RequireGroupeRead,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupeMembersResponse>, AppError> {
    let members = GroupeService::members(&state.db, id).await?;
    Ok(Json(members))
}
