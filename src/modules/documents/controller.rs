use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::{AppError, PaginationParams};
use scolaris_models::uploads::{Document, PaginatedDocumentsResponse, UploadForm};

use crate::middleware::auth::{
    RequireDocumentCreate, RequireDocumentDelete, RequireDocumentRead, RequireDocumentUpdate,
};
use crate::modules::uploads::form::read_upload_form;
use crate::modules::uploads::service::{DOCUMENTS, UploadService};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document uploaded", body = Document),
        (status = 400, description = "Missing file or file type not allowed"),
        (status = 413, description = "File too large")
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn upload_document(
    State(state): State<AppState>,
    RequireDocumentCreate(auth): RequireDocumentCreate,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let fields = read_upload_form(&mut multipart).await?;
    let document = UploadService::create::<Document>(
        &state.db,
        state.storage.as_ref(),
        &DOCUMENTS,
        auth.user_id,
        fields,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    get,
    path = "/api/documents",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated documents", body = PaginatedDocumentsResponse)
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_documents(
    State(state): State<AppState>,
    _auth: RequireDocumentRead,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedDocumentsResponse>, AppError> {
    let (data, meta) = UploadService::list::<Document>(&state.db, &DOCUMENTS, pagination).await?;
    Ok(Json(PaginatedDocumentsResponse { data, meta }))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document", body = Document),
        (status = 404, description = "Document not found")
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_document(
    State(state): State<AppState>,
    _auth: RequireDocumentRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, AppError> {
    let document = UploadService::get::<Document>(&state.db, &DOCUMENTS, id).await?;
    Ok(Json(document))
}

#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document updated", body = Document),
        (status = 400, description = "File type not allowed"),
        (status = 404, description = "Document not found"),
        (status = 413, description = "File too large")
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn update_document(
    State(state): State<AppState>,
    _auth: RequireDocumentUpdate,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Document>, AppError> {
    let fields = read_upload_form(&mut multipart).await?;
    let document =
        UploadService::update::<Document>(&state.db, state.storage.as_ref(), &DOCUMENTS, id, fields).await?;
    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document and its file deleted"),
        (status = 404, description = "Document not found")
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_document(
    State(state): State<AppState>,
    _auth: RequireDocumentDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    UploadService::delete(&state.db, state.storage.as_ref(), &DOCUMENTS, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
