//! Storage-backed uploads.
//!
//! Documents and resources share the same lifecycle and differ only by table,
//! type column and accepted extensions, described by an [`UploadTable`].
//! The file is written before its row; a failed insert removes the file again.

use anyhow::anyhow;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgRow;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use scolaris_core::file_storage::{FileStorage, StorageError, UploadKind};
use scolaris_core::{AppError, PaginationMeta, PaginationParams};

use crate::metrics::track_upload;
use crate::utils::db::{SqlFilters, fetch_page};

use super::form::{UploadFields, UploadedFile};

#[derive(Debug, Clone, Copy)]
pub struct UploadTable {
    pub kind: UploadKind,
    pub table: &'static str,
    pub type_column: &'static str,
    pub label: &'static str,
}

pub const DOCUMENTS: UploadTable = UploadTable {
    kind: UploadKind::Document,
    table: "documents",
    type_column: "document_type",
    label: "Document",
};

pub const RESOURCES: UploadTable = UploadTable {
    kind: UploadKind::Resource,
    table: "resources",
    type_column: "resource_type",
    label: "Resource",
};

impl UploadTable {
    fn columns(&self) -> String {
        format!(
            "id, name, {}, file_key, file_url, size, upload_date, user_id, created_at, updated_at",
            self.type_column
        )
    }

    fn not_found(&self) -> AppError {
        AppError::not_found(anyhow!("{} not found", self.label))
    }

    fn metric_label(&self) -> &'static str {
        match self.kind {
            UploadKind::Document => "document",
            UploadKind::Resource => "resource",
        }
    }
}

pub fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::InvalidExtension { .. } => {
            AppError::bad_request(anyhow!("File type not allowed"))
        }
        StorageError::InvalidFileSize { .. } => AppError::payload_too_large(e.to_string()),
        StorageError::InvalidKey(_) => AppError::bad_request(anyhow!(e.to_string())),
        StorageError::IoError(_) => AppError::internal(e),
    }
}

/// A file written to storage, not yet referenced by a row.
struct StoredFile {
    key: String,
    url: String,
    extension: String,
    size: i64,
}

async fn store(
    storage: &dyn FileStorage,
    table: &UploadTable,
    file: &UploadedFile,
) -> Result<StoredFile, AppError> {
    let extension = table
        .kind
        .validate_extension(&file.file_name)
        .map_err(storage_error)?;
    let key = table
        .kind
        .storage_key(&file.file_name, Utc::now())
        .map_err(storage_error)?;

    storage.save(&key, &file.bytes).await.map_err(storage_error)?;
    let url = storage.get_url(&key).map_err(storage_error)?;

    Ok(StoredFile {
        key,
        url,
        extension,
        size: file.bytes.len() as i64,
    })
}

async fn discard(storage: &dyn FileStorage, key: &str) {
    if let Err(e) = storage.delete(key).await {
        warn!(key = %key, error = %e, "Failed to delete stored file");
    }
}

pub struct UploadService;

impl UploadService {
    #[instrument(skip(db, storage, fields), fields(table = table.table))]
    pub async fn create<T>(
        db: &PgPool,
        storage: &dyn FileStorage,
        table: &UploadTable,
        user_id: Uuid,
        fields: UploadFields,
    ) -> Result<T, AppError>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let file = fields
            .file
            .ok_or_else(|| AppError::bad_request(anyhow!("No file uploaded")))?;
        let stored = store(storage, table, &file).await?;

        let name = fields.name.unwrap_or_else(|| file.file_name.clone());
        let kind = fields.kind.unwrap_or_else(|| stored.extension.clone());

        let inserted = sqlx::query_as::<_, T>(&format!(
            "INSERT INTO {} (name, {}, file_key, file_url, size, upload_date, user_id)
             VALUES ($1, $2, $3, $4, $5, NOW(), $6)
             RETURNING {}",
            table.table,
            table.type_column,
            table.columns()
        ))
        .bind(&name)
        .bind(&kind)
        .bind(&stored.key)
        .bind(&stored.url)
        .bind(stored.size)
        .bind(user_id)
        .fetch_one(db)
        .await;

        match inserted {
            Ok(row) => {
                track_upload(table.metric_label());
                info!(key = %stored.key, size = stored.size, "File uploaded");
                Ok(row)
            }
            Err(e) => {
                discard(storage, &stored.key).await;
                Err(e.into())
            }
        }
    }

    #[instrument(skip(db), fields(table = table.table))]
    pub async fn list<T>(
        db: &PgPool,
        table: &UploadTable,
        pagination: PaginationParams,
    ) -> Result<(Vec<T>, PaginationMeta), AppError>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        fetch_page(
            db,
            &table.columns(),
            table.table,
            &SqlFilters::new(),
            "upload_date DESC",
            &pagination,
        )
        .await
    }

    #[instrument(skip(db), fields(table = table.table))]
    pub async fn get<T>(db: &PgPool, table: &UploadTable, id: Uuid) -> Result<T, AppError>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        sqlx::query_as::<_, T>(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            table.columns(),
            table.table
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| table.not_found())
    }

    /// Applies the given fields. A new file replaces the stored object and
    /// the previous one is deleted once the row points at the new key.
    #[instrument(skip(db, storage, fields), fields(table = table.table))]
    pub async fn update<T>(
        db: &PgPool,
        storage: &dyn FileStorage,
        table: &UploadTable,
        id: Uuid,
        fields: UploadFields,
    ) -> Result<T, AppError>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let old_key = sqlx::query_scalar::<_, String>(&format!(
            "SELECT file_key FROM {} WHERE id = $1",
            table.table
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| table.not_found())?;

        let stored = match &fields.file {
            Some(file) => Some(store(storage, table, file).await?),
            None => None,
        };
        let kind = fields
            .kind
            .or_else(|| stored.as_ref().map(|s| s.extension.clone()));

        let updated = sqlx::query_as::<_, T>(&format!(
            "UPDATE {table} SET
                name = COALESCE($2, name),
                {type_column} = COALESCE($3, {type_column}),
                file_key = COALESCE($4, file_key),
                file_url = COALESCE($5, file_url),
                size = COALESCE($6, size),
                upload_date = CASE WHEN $4 IS NULL THEN upload_date ELSE NOW() END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {columns}",
            table = table.table,
            type_column = table.type_column,
            columns = table.columns()
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&kind)
        .bind(stored.as_ref().map(|s| s.key.as_str()))
        .bind(stored.as_ref().map(|s| s.url.as_str()))
        .bind(stored.as_ref().map(|s| s.size))
        .fetch_optional(db)
        .await;

        match (updated, stored) {
            (Ok(Some(row)), Some(stored)) => {
                discard(storage, &old_key).await;
                track_upload(table.metric_label());
                info!(key = %stored.key, replaced = %old_key, "File replaced");
                Ok(row)
            }
            (Ok(Some(row)), None) => Ok(row),
            (Ok(None), stored) => {
                if let Some(stored) = stored {
                    discard(storage, &stored.key).await;
                }
                Err(table.not_found())
            }
            (Err(e), stored) => {
                if let Some(stored) = stored {
                    discard(storage, &stored.key).await;
                }
                Err(e.into())
            }
        }
    }

    #[instrument(skip(db, storage), fields(table = table.table))]
    pub async fn delete(
        db: &PgPool,
        storage: &dyn FileStorage,
        table: &UploadTable,
        id: Uuid,
    ) -> Result<(), AppError> {
        let key = sqlx::query_scalar::<_, String>(&format!(
            "DELETE FROM {} WHERE id = $1 RETURNING file_key",
            table.table
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| table.not_found())?;

        discard(storage, &key).await;
        Ok(())
    }
}
