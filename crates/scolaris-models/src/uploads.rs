//! Uploaded documents and teaching resources.
//!
//! Both are stored through `FileStorage`; the database keeps the storage key,
//! the public URL and the metadata.

use chrono::{DateTime, Utc};
use scolaris_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub document_type: String,
    pub file_key: String,
    pub file_url: String,
    pub size: i64,
    pub upload_date: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub resource_type: String,
    pub file_key: String,
    pub file_url: String,
    pub size: i64,
    pub upload_date: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Multipart form accepted by the upload endpoints. Only used for the
/// OpenAPI schema; handlers read the fields from `axum::extract::Multipart`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadForm {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Display name; defaults to the original file name
    pub name: Option<String>,
    /// Type label; defaults to the file extension
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedDocumentsResponse {
    pub data: Vec<Document>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResourcesResponse {
    pub data: Vec<Resource>,
    pub meta: PaginationMeta,
}
