use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::course_modules::{
    CourseModule, CreateModuleDto, ModuleFilterParams, ModuleScheduleResponse,
    PaginatedModulesResponse, ScheduleQuery, UpdateModuleDto,
};
use scolaris_models::sessions::Session;

use crate::modules::sessions::service::SESSION_COLUMNS;
use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

/// Column list matching [`CourseModule`].
pub const MODULE_COLUMNS: &str =
    "id, title, description, credits, credit_required, niveau_id, filiere_id, created_at, updated_at";

fn map_module_write_error(e: sqlx::Error) -> AppError {
    map_write_error(
        e,
        "A module with this title already exists",
        "Niveau or filiere does not exist",
    )
}

/// Both dates are required and `start_date` may not be after `end_date`.
pub fn schedule_range(query: &ScheduleQuery) -> Result<(NaiveDate, NaiveDate), AppError> {
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(AppError::bad_request(anyhow!(
            "start_date and end_date are required"
        )));
    };

    if start > end {
        return Err(AppError::bad_request(anyhow!(
            "start_date must be before or equal to end_date"
        )));
    }

    Ok((start, end))
}

pub struct ModuleService;

impl ModuleService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateModuleDto) -> Result<CourseModule, AppError> {
        sqlx::query_as::<_, CourseModule>(&format!(
            "INSERT INTO modules (title, description, credits, credit_required, niveau_id, filiere_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.credits)
        .bind(dto.credit_required)
        .bind(dto.niveau_id)
        .bind(dto.filiere_id)
        .fetch_one(db)
        .await
        .map_err(map_module_write_error)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: ModuleFilterParams,
    ) -> Result<PaginatedModulesResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(title) = &filters.title {
            where_sql.push_ilike("title", title);
        }
        if let Some(credits) = filters.credits {
            where_sql.push("credits = ${}::int", credits);
        }
        if let Some(credit_required) = filters.credit_required {
            where_sql.push("credit_required = ${}::int", credit_required);
        }
        if let Some(niveau_id) = filters.niveau_id {
            where_sql.push("niveau_id = ${}::uuid", niveau_id);
        }
        if let Some(filiere_id) = filters.filiere_id {
            where_sql.push("filiere_id = ${}::uuid", filiere_id);
        }

        let (data, meta) = fetch_page(
            db,
            MODULE_COLUMNS,
            "modules",
            &where_sql,
            "title",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedModulesResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<CourseModule, AppError> {
        sqlx::query_as::<_, CourseModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Module not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        dto: UpdateModuleDto,
    ) -> Result<CourseModule, AppError> {
        sqlx::query_as::<_, CourseModule>(&format!(
            "UPDATE modules SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                credits = COALESCE($4, credits),
                credit_required = COALESCE($5, credit_required),
                niveau_id = COALESCE($6, niveau_id),
                filiere_id = COALESCE($7, filiere_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.credits)
        .bind(dto.credit_required)
        .bind(dto.niveau_id)
        .bind(dto.filiere_id)
        .fetch_optional(db)
        .await
        .map_err(map_module_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Module not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Module not found")));
        }

        Ok(())
    }

    /// Sessions of the module dated within `[start_date, end_date]`.
    #[instrument(skip(db))]
    pub async fn schedule(
        db: &PgPool,
        id: Uuid,
        query: ScheduleQuery,
    ) -> Result<ModuleScheduleResponse, AppError> {
        let (start, end) = schedule_range(&query)?;

        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS}
             FROM sessions
             WHERE module_id = $1 AND date BETWEEN $2 AND $3
             ORDER BY date, start_date_time"
        ))
        .bind(id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;

        if sessions.is_empty() {
            return Err(AppError::not_found(anyhow!(
                "No sessions found for this module in the given date range"
            )));
        }

        Ok(ModuleScheduleResponse {
            module_id: id,
            total_sessions: sessions.len(),
            sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn query(start: Option<&str>, end: Option<&str>) -> ScheduleQuery {
        ScheduleQuery {
            start_date: start.map(|d| d.parse().unwrap()),
            end_date: end.map(|d| d.parse().unwrap()),
        }
    }

    #[test]
    fn test_schedule_range_requires_both_dates() {
        let err = schedule_range(&query(Some("2024-10-01"), None)).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(schedule_range(&query(None, None)).is_err());
    }

    #[test]
    fn test_schedule_range_rejects_inverted_dates() {
        let err = schedule_range(&query(Some("2024-10-08"), Some("2024-10-01"))).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_schedule_range_allows_single_day() {
        let (start, end) = schedule_range(&query(Some("2024-10-07"), Some("2024-10-07"))).unwrap();
        assert_eq!(start, end);
    }
}
