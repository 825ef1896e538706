use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::course_modules::CourseModule;
use scolaris_models::filieres::{
    CreateFiliereDto, Filiere, FiliereFilterParams, PaginatedFilieresResponse, UpdateFiliereDto,
};

use crate::modules::course_modules::service::MODULE_COLUMNS;
use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const FILIERE_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";
const NAME_TAKEN: &str = "A filiere with this name already exists";

pub struct FiliereService;

impl FiliereService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateFiliereDto) -> Result<Filiere, AppError> {
        sqlx::query_as::<_, Filiere>(&format!(
            "INSERT INTO filieres (name, description, is_active)
             VALUES ($1, $2, COALESCE($3, TRUE))
             RETURNING {FILIERE_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.is_active)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, NAME_TAKEN, NAME_TAKEN))
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: FiliereFilterParams,
    ) -> Result<PaginatedFilieresResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(name) = &filters.name {
            where_sql.push_ilike("name", name);
        }
        if let Some(is_active) = filters.is_active {
            where_sql.push("is_active = ${}::boolean", is_active);
        }

        let (data, meta) = fetch_page(
            db,
            FILIERE_COLUMNS,
            "filieres",
            &where_sql,
            "name",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedFilieresResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Filiere, AppError> {
        sqlx::query_as::<_, Filiere>(&format!(
            "SELECT {FILIERE_COLUMNS} FROM filieres WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Filiere not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        dto: UpdateFiliereDto,
    ) -> Result<Filiere, AppError> {
        sqlx::query_as::<_, Filiere>(&format!(
            "UPDATE filieres SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {FILIERE_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.is_active)
        .fetch_optional(db)
        .await
        .map_err(|e| map_write_error(e, NAME_TAKEN, NAME_TAKEN))?
        .ok_or_else(|| AppError::not_found(anyhow!("Filiere not found")))
    }

    /// Deleting a filiere cascades to its niveaux and modules.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM filieres WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Filiere not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn modules(db: &PgPool, id: Uuid) -> Result<Vec<CourseModule>, AppError> {
        Self::get(db, id).await?;

        let modules = sqlx::query_as::<_, CourseModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE filiere_id = $1 ORDER BY title"
        ))
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(modules)
    }
}
