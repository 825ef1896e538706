use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::groupes::{
    CreateGroupeDto, Groupe, GroupeFilterParams, GroupeMembersResponse, PaginatedGroupesResponse,
    UpdateGroupeDto,
};
use scolaris_models::users::UserSummary;

use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const GROUPE_COLUMNS: &str = "id, groupe_name, niveau_id, created_at, updated_at";

fn map_groupe_write_error(e: sqlx::Error) -> AppError {
    map_write_error(e, "This groupe already exists", "Niveau does not exist")
}

pub struct GroupeService;

impl GroupeService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateGroupeDto) -> Result<Groupe, AppError> {
        sqlx::query_as::<_, Groupe>(&format!(
            "INSERT INTO groupes (groupe_name, niveau_id)
             VALUES ($1, $2)
             RETURNING {GROUPE_COLUMNS}"
        ))
        .bind(dto.groupe_name.trim())
        .bind(dto.niveau_id)
        .fetch_one(db)
        .await
        .map_err(map_groupe_write_error)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: GroupeFilterParams,
    ) -> Result<PaginatedGroupesResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(niveau_id) = filters.niveau_id {
            where_sql.push("niveau_id = ${}::uuid", niveau_id);
        }

        let (data, meta) = fetch_page(
            db,
            GROUPE_COLUMNS,
            "groupes",
            &where_sql,
            "groupe_name",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedGroupesResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Groupe, AppError> {
        sqlx::query_as::<_, Groupe>(&format!(
            "SELECT {GROUPE_COLUMNS} FROM groupes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Groupe not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateGroupeDto) -> Result<Groupe, AppError> {
        sqlx::query_as::<_, Groupe>(&format!(
            "UPDATE groupes SET
                groupe_name = COALESCE($2, groupe_name),
                niveau_id = COALESCE($3, niveau_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {GROUPE_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.groupe_name.as_deref().map(str::trim))
        .bind(dto.niveau_id)
        .fetch_optional(db)
        .await
        .map_err(map_groupe_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Groupe not found")))
    }

    /// Members of a deleted groupe keep their account with `groupe_id` cleared.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM groupes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Groupe not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn members(db: &PgPool, id: Uuid) -> Result<GroupeMembersResponse, AppError> {
        let groupe = Self::get(db, id).await?;

        let membres = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name, email
             FROM users
             WHERE groupe_id = $1
             ORDER BY last_name, first_name",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(GroupeMembersResponse {
            groupe,
            count: membres.len(),
            membres,
        })
    }
}
