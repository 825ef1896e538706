use anyhow::anyhow;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_core::permissions::{PermissionSet, normalize_tokens};
use scolaris_models::permissions::{
    CreatePermissionSetDto, RolePermissionSet, UpdatePermissionSetDto,
};

use crate::utils::db::map_write_error;

const SET_COLUMNS: &str =
    "id, description, permissions_allowed, role_id, created_at, updated_at";

pub struct PermissionSetService;

impl PermissionSetService {
    /// Role name and the sorted union of every permission set of the role.
    #[instrument(skip(db))]
    pub async fn resolve_for_role(
        db: &PgPool,
        role_id: Option<Uuid>,
    ) -> Result<(Option<String>, Vec<String>), AppError> {
        let Some(role_id) = role_id else {
            return Ok((None, Vec::new()));
        };

        #[derive(sqlx::FromRow)]
        struct Resolved {
            role_name: String,
            permissions: Vec<String>,
        }

        let resolved = sqlx::query_as::<_, Resolved>(
            r#"SELECT r.role_name,
                      ARRAY(
                          SELECT DISTINCT perm
                          FROM permissions p, unnest(p.permissions_allowed) AS perm
                          WHERE p.role_id = r.id
                          ORDER BY perm
                      ) AS permissions
               FROM roles r
               WHERE r.id = $1"#,
        )
        .bind(role_id)
        .fetch_optional(db)
        .await?;

        Ok(match resolved {
            Some(r) => (
                Some(r.role_name),
                PermissionSet::from_tokens(r.permissions).into_vec(),
            ),
            None => (None, Vec::new()),
        })
    }

    #[instrument(skip(db))]
    pub async fn list(db: &PgPool) -> Result<Vec<RolePermissionSet>, AppError> {
        let sets = sqlx::query_as::<_, RolePermissionSet>(&format!(
            "SELECT {SET_COLUMNS} FROM permissions ORDER BY created_at"
        ))
        .fetch_all(db)
        .await?;

        Ok(sets)
    }

    #[instrument(skip(db))]
    pub async fn list_for_role(
        db: &PgPool,
        role_id: Uuid,
    ) -> Result<Vec<RolePermissionSet>, AppError> {
        let sets = sqlx::query_as::<_, RolePermissionSet>(&format!(
            "SELECT {SET_COLUMNS} FROM permissions WHERE role_id = $1 ORDER BY created_at"
        ))
        .bind(role_id)
        .fetch_all(db)
        .await?;

        if sets.is_empty() {
            return Err(AppError::not_found(anyhow!(
                "No permissions found for this role"
            )));
        }

        Ok(sets)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<RolePermissionSet, AppError> {
        sqlx::query_as::<_, RolePermissionSet>(&format!(
            "SELECT {SET_COLUMNS} FROM permissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Permission set not found")))
    }

    #[instrument(skip(db))]
    pub async fn create(
        db: &PgPool,
        dto: CreatePermissionSetDto,
    ) -> Result<RolePermissionSet, AppError> {
        let tokens = normalize_tokens(&dto.permissions_allowed)
            .map_err(|e| AppError::bad_request(anyhow!(e.to_string())))?;

        Self::ensure_role_exists(db, dto.role_id).await?;

        sqlx::query_as::<_, RolePermissionSet>(&format!(
            "INSERT INTO permissions (description, permissions_allowed, role_id)
             VALUES ($1, $2, $3)
             RETURNING {SET_COLUMNS}"
        ))
        .bind(&dto.description)
        .bind(&tokens)
        .bind(dto.role_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, "Permission set already exists", "Role not found"))
    }

    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        dto: UpdatePermissionSetDto,
    ) -> Result<RolePermissionSet, AppError> {
        let tokens = dto
            .permissions_allowed
            .as_ref()
            .map(|tokens| normalize_tokens(tokens))
            .transpose()
            .map_err(|e| AppError::bad_request(anyhow!(e.to_string())))?;

        if let Some(role_id) = dto.role_id {
            Self::ensure_role_exists(db, role_id).await?;
        }

        sqlx::query_as::<_, RolePermissionSet>(&format!(
            "UPDATE permissions SET
                description = COALESCE($2, description),
                permissions_allowed = COALESCE($3, permissions_allowed),
                role_id = COALESCE($4, role_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {SET_COLUMNS}"
        ))
        .bind(id)
        .bind(&dto.description)
        .bind(&tokens)
        .bind(dto.role_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Permission set not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Permission set not found")));
        }

        Ok(())
    }

    /// Adding a token the set already holds returns the set unchanged.
    #[instrument(skip(db))]
    pub async fn add_permission(
        db: &PgPool,
        id: Uuid,
        token: &str,
    ) -> Result<RolePermissionSet, AppError> {
        let mut tx = db.begin().await?;
        let set = Self::lock(&mut tx, id).await?;
        let mut tokens = PermissionSet::from_tokens(&set.permissions_allowed);

        let added = tokens
            .add(token)
            .map_err(|e| AppError::bad_request(anyhow!(e.to_string())))?;
        if !added {
            return Ok(set);
        }

        let set = Self::store_tokens(&mut tx, id, tokens.into_vec()).await?;
        tx.commit().await?;
        Ok(set)
    }

    #[instrument(skip(db))]
    pub async fn remove_permission(
        db: &PgPool,
        id: Uuid,
        token: &str,
    ) -> Result<RolePermissionSet, AppError> {
        let mut tx = db.begin().await?;
        let set = Self::lock(&mut tx, id).await?;
        let mut tokens = PermissionSet::from_tokens(&set.permissions_allowed);

        if !tokens.remove(token) {
            return Err(AppError::not_found(anyhow!("Permission not found in set")));
        }

        let set = Self::store_tokens(&mut tx, id, tokens.into_vec()).await?;
        tx.commit().await?;
        Ok(set)
    }

    /// Reads the set and holds its row lock until `tx` ends, so concurrent
    /// token edits on the same set apply one after the other.
    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<RolePermissionSet, AppError> {
        sqlx::query_as::<_, RolePermissionSet>(&format!(
            "SELECT {SET_COLUMNS} FROM permissions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Permission set not found")))
    }

    async fn store_tokens(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        tokens: Vec<String>,
    ) -> Result<RolePermissionSet, AppError> {
        let set = sqlx::query_as::<_, RolePermissionSet>(&format!(
            "UPDATE permissions SET permissions_allowed = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {SET_COLUMNS}"
        ))
        .bind(id)
        .bind(&tokens)
        .fetch_one(&mut **tx)
        .await?;

        Ok(set)
    }

    async fn ensure_role_exists(db: &PgPool, role_id: Uuid) -> Result<(), AppError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
            .bind(role_id)
            .fetch_one(db)
            .await?;

        if !exists.0 {
            return Err(AppError::not_found(anyhow!("Role not found")));
        }

        Ok(())
    }
}
