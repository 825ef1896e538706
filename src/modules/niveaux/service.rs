use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::course_modules::CourseModule;
use scolaris_models::niveaux::{
    CreateNiveauDto, Niveau, NiveauFilterParams, PaginatedNiveauxResponse, UpdateNiveauDto,
};

use crate::modules::course_modules::service::MODULE_COLUMNS;
use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const NIVEAU_COLUMNS: &str =
    "id, name, filiere_id, academic_year, credits_required, created_at, updated_at";

fn map_niveau_write_error(e: sqlx::Error) -> AppError {
    map_write_error(e, "This niveau already exists", "Filiere does not exist")
}

pub struct NiveauService;

impl NiveauService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateNiveauDto) -> Result<Niveau, AppError> {
        sqlx::query_as::<_, Niveau>(&format!(
            "INSERT INTO niveaux (name, filiere_id, academic_year, credits_required)
             VALUES ($1, $2, $3, $4)
             RETURNING {NIVEAU_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(dto.filiere_id)
        .bind(dto.academic_year.trim())
        .bind(dto.credits_required)
        .fetch_one(db)
        .await
        .map_err(map_niveau_write_error)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: NiveauFilterParams,
    ) -> Result<PaginatedNiveauxResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(filiere_id) = filters.filiere_id {
            where_sql.push("filiere_id = ${}::uuid", filiere_id);
        }
        if let Some(academic_year) = &filters.academic_year {
            where_sql.push("academic_year = ${}", academic_year);
        }

        let (data, meta) = fetch_page(
            db,
            NIVEAU_COLUMNS,
            "niveaux",
            &where_sql,
            "academic_year, name",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedNiveauxResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Niveau, AppError> {
        sqlx::query_as::<_, Niveau>(&format!(
            "SELECT {NIVEAU_COLUMNS} FROM niveaux WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Niveau not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateNiveauDto) -> Result<Niveau, AppError> {
        sqlx::query_as::<_, Niveau>(&format!(
            "UPDATE niveaux SET
                name = COALESCE($2, name),
                filiere_id = COALESCE($3, filiere_id),
                academic_year = COALESCE($4, academic_year),
                credits_required = COALESCE($5, credits_required),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {NIVEAU_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.filiere_id)
        .bind(dto.academic_year.as_deref().map(str::trim))
        .bind(dto.credits_required)
        .fetch_optional(db)
        .await
        .map_err(map_niveau_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Niveau not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM niveaux WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Niveau not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn modules(db: &PgPool, id: Uuid) -> Result<Vec<CourseModule>, AppError> {
        Self::get(db, id).await?;

        let modules = sqlx::query_as::<_, CourseModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE niveau_id = $1 ORDER BY title"
        ))
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(modules)
    }
}
