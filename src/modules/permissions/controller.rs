use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::permissions::{
    CreatePermissionSetDto, PermissionTokenDto, RolePermissionSet, UpdatePermissionSetDto,
};

use crate::middleware::auth::{
    RequirePermissionCreate, RequirePermissionDelete, RequirePermissionRead,
    RequirePermissionUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::PermissionSetService;

#[utoipa::path(
    get,
    path = "/api/permissions",
    responses(
        (status = 200, description = "All permission sets", body = Vec<RolePermissionSet>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_permission_sets(
    State(state): State<AppState>,
    _auth: RequirePermissionRead,
) -> Result<Json<Vec<RolePermissionSet>>, AppError> {
    let sets = PermissionSetService::list(&state.db).await?;
    Ok(Json(sets))
}

#[utoipa::path(
    get,
    path = "/api/permissions/role/{role_id}",
    params(("role_id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Permission sets of the role", body = Vec<RolePermissionSet>),
        (status = 404, description = "No permissions found for this role")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_role_permission_sets(
    State(state): State<AppState>,
    _auth: RequirePermissionRead,
    Path(role_id): Path<Uuid>,
) -> Result<Json<Vec<RolePermissionSet>>, AppError> {
    let sets = PermissionSetService::list_for_role(&state.db, role_id).await?;
    Ok(Json(sets))
}

#[utoipa::path(
    get,
    path = "/api/permissions/{id}",
    params(("id" = Uuid, Path, description = "Permission set ID")),
    responses(
        (status = 200, description = "Permission set", body = RolePermissionSet),
        (status = 404, description = "Permission set not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_permission_set(
    State(state): State<AppState>,
    _auth: RequirePermissionRead,
    Path(id): Path<Uuid>,
) -> Result<Json<RolePermissionSet>, AppError> {
    let set = PermissionSetService::get(&state.db, id).await?;
    Ok(Json(set))
}

#[utoipa::path(
    post,
    path = "/api/permissions",
    request_body = CreatePermissionSetDto,
    responses(
        (status = 201, description = "Permission set created", body = RolePermissionSet),
        (status = 400, description = "Invalid permission format"),
        (status = 404, description = "Role not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_permission_set(
    State(state): State<AppState>,
    _auth: RequirePermissionCreate,
    ValidatedJson(dto): ValidatedJson<CreatePermissionSetDto>,
) -> Result<(StatusCode, Json<RolePermissionSet>), AppError> {
    let set = PermissionSetService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(set)))
}

#[utoipa::path(
    put,
    path = "/api/permissions/{id}",
    params(("id" = Uuid, Path, description = "Permission set ID")),
    request_body = UpdatePermissionSetDto,
    responses(
        (status = 200, description = "Permission set updated", body = RolePermissionSet),
        (status = 400, description = "Invalid permission format"),
        (status = 404, description = "Permission set not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_permission_set(
    State(state): State<AppState>,
    _auth: RequirePermissionUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdatePermissionSetDto>,
) -> Result<Json<RolePermissionSet>, AppError> {
    let set = PermissionSetService::update(&state.db, id, dto).await?;
    Ok(Json(set))
}

#[utoipa::path(
    delete,
    path = "/api/permissions/{id}",
    params(("id" = Uuid, Path, description = "Permission set ID")),
    responses(
        (status = 204, description = "Permission set deleted"),
        (status = 404, description = "Permission set not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_permission_set(
    State(state): State<AppState>,
    _auth: RequirePermissionDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    PermissionSetService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/permissions/{id}/add-permission",
    params(("id" = Uuid, Path, description = "Permission set ID")),
    request_body = PermissionTokenDto,
    responses(
        (status = 200, description = "Token added, or already present", body = RolePermissionSet),
        (status = 400, description = "Invalid permission format"),
        (status = 404, description = "Permission set not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_permission(
    State(state): State<AppState>,
    _auth: RequirePermissionUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<PermissionTokenDto>,
) -> Result<Json<RolePermissionSet>, AppError> {
    let set = PermissionSetService::add_permission(&state.db, id, &dto.permission).await?;
    Ok(Json(set))
}

#[utoipa::path(
    patch,
    path = "/api/permissions/{id}/remove-permission",
    params(("id" = Uuid, Path, description = "Permission set ID")),
    request_body = PermissionTokenDto,
    responses(
        (status = 200, description = "Token removed", body = RolePermissionSet),
        (status = 404, description = "Permission not found in set")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_permission(
    State(state): State<AppState>,
    _auth: RequirePermissionUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<PermissionTokenDto>,
) -> Result<Json<RolePermissionSet>, AppError> {
    let set = PermissionSetService::remove_permission(&state.db, id, &dto.permission).await?;
    Ok(Json(set))
}
