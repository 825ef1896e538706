use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::{AppError, PaginationParams};
use scolaris_models::uploads::{PaginatedResourcesResponse, Resource, UploadForm};

use crate::middleware::auth::{
    RequireResourceCreate, RequireResourceDelete, RequireResourceRead, RequireResourceUpdate,
};
use crate::modules::uploads::form::read_upload_form;
use crate::modules::uploads::service::{RESOURCES, UploadService};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/resources",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Resource uploaded", body = Resource),
        (status = 400, description = "Missing file or file type not allowed"),
        (status = 413, description = "File too large")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn upload_resource(
    State(state): State<AppState>,
    RequireResourceCreate(auth): RequireResourceCreate,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Resource>), AppError> {
    let fields = read_upload_form(&mut multipart).await?;
    let resource = UploadService::create::<Resource>(
        &state.db,
        state.storage.as_ref(),
        &RESOURCES,
        auth.user_id,
        fields,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

#[utoipa::path(
    get,
    path = "/api/resources",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated resources", body = PaginatedResourcesResponse)
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_resources(
    State(state): State<AppState>,
    _auth: RequireResourceRead,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResourcesResponse>, AppError> {
    let (data, meta) = UploadService::list::<Resource>(&state.db, &RESOURCES, pagination).await?;
    Ok(Json(PaginatedResourcesResponse { data, meta }))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource", body = Resource),
        (status = 404, description = "Resource not found")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_resource(
    State(state): State<AppState>,
    _auth: RequireResourceRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Resource>, AppError> {
    let resource = UploadService::get::<Resource>(&state.db, &RESOURCES, id).await?;
    Ok(Json(resource))
}

#[utoipa::path(
    put,
    path = "/api/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 400, description = "File type not allowed"),
        (status = 404, description = "Resource not found"),
        (status = 413, description = "File too large")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn update_resource(
    State(state): State<AppState>,
    _auth: RequireResourceUpdate,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Resource>, AppError> {
    let fields = read_upload_form(&mut multipart).await?;
    let resource =
        UploadService::update::<Resource>(&state.db, state.storage.as_ref(), &RESOURCES, id, fields).await?;
    Ok(Json(resource))
}

#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 204, description = "Resource and its file deleted"),
        (status = 404, description = "Resource not found")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_resource(
    State(state): State<AppState>,
    _auth: RequireResourceDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    UploadService::delete(&state.db, state.storage.as_ref(), &RESOURCES, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
