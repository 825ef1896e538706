use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::attendance_lists::{
    AttendanceList, AttendanceListFilterParams, CreateAttendanceListDto,
    PaginatedAttendanceListsResponse, UpdateAttendanceListDto,
};

use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const LIST_COLUMNS: &str = "id, name, event_id, created_at, updated_at";

fn map_list_write_error(e: sqlx::Error) -> AppError {
    map_write_error(
        e,
        "This attendance list already exists",
        "Event does not exist",
    )
}

pub struct AttendanceListService;

impl AttendanceListService {
    #[instrument(skip(db))]
    pub async fn create(
        db: &PgPool,
        dto: CreateAttendanceListDto,
    ) -> Result<AttendanceList, AppError> {
        sqlx::query_as::<_, AttendanceList>(&format!(
            "INSERT INTO attendance_lists (name, event_id)
             VALUES ($1, $2)
             RETURNING {LIST_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(dto.event_id)
        .fetch_one(db)
        .await
        .map_err(map_list_write_error)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: AttendanceListFilterParams,
    ) -> Result<PaginatedAttendanceListsResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(name) = &filters.name {
            where_sql.push_ilike("name", name);
        }
        if let Some(event_id) = filters.event_id {
            where_sql.push("event_id = ${}::uuid", event_id);
        }

        let (data, meta) = fetch_page(
            db,
            LIST_COLUMNS,
            "attendance_lists",
            &where_sql,
            "created_at DESC",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedAttendanceListsResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<AttendanceList, AppError> {
        sqlx::query_as::<_, AttendanceList>(&format!(
            "SELECT {LIST_COLUMNS} FROM attendance_lists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Attendance list not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        dto: UpdateAttendanceListDto,
    ) -> Result<AttendanceList, AppError> {
        sqlx::query_as::<_, AttendanceList>(&format!(
            "UPDATE attendance_lists SET
                name = COALESCE($2, name),
                event_id = COALESCE($3, event_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {LIST_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.event_id)
        .fetch_optional(db)
        .await
        .map_err(map_list_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Attendance list not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM attendance_lists WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Attendance list not found")));
        }

        Ok(())
    }
}
