use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::roles::{
    CreateRoleDto, PaginatedRolesResponse, Role, RoleFilterParams, RoleWithPermissions,
    UpdateRoleDto,
};
use scolaris_models::system_roles;

use crate::modules::permissions::service::PermissionSetService;
use crate::utils::db::{SqlFilters, fetch_page};

const ROLE_COLUMNS: &str = "id, role_name, created_at, updated_at";

fn map_role_name_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::conflict(anyhow!("A role with this name already exists"));
    }
    AppError::from(e)
}

#[instrument(skip(db))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<Role, AppError> {
    sqlx::query_as::<_, Role>(&format!(
        "INSERT INTO roles (role_name) VALUES ($1) RETURNING {ROLE_COLUMNS}"
    ))
    .bind(dto.role_name.trim())
    .fetch_one(db)
    .await
    .map_err(map_role_name_conflict)
}

#[instrument(skip(db))]
pub async fn get_roles(
    db: &PgPool,
    filters: RoleFilterParams,
) -> Result<PaginatedRolesResponse, AppError> {
    let mut where_sql = SqlFilters::new();
    if let Some(role_name) = &filters.role_name {
        where_sql.push_ilike("role_name", role_name);
    }

    let (data, meta) = fetch_page(
        db,
        ROLE_COLUMNS,
        "roles",
        &where_sql,
        "role_name",
        &filters.pagination,
    )
    .await?;

    Ok(PaginatedRolesResponse { data, meta })
}

#[instrument(skip(db))]
pub async fn get_role_by_id(db: &PgPool, id: Uuid) -> Result<RoleWithPermissions, AppError> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

    let (_, permissions) = PermissionSetService::resolve_for_role(db, Some(role.id)).await?;

    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(db))]
pub async fn update_role(db: &PgPool, id: Uuid, dto: UpdateRoleDto) -> Result<Role, AppError> {
    sqlx::query_as::<_, Role>(&format!(
        "UPDATE roles SET role_name = $2, updated_at = NOW() WHERE id = $1 RETURNING {ROLE_COLUMNS}"
    ))
    .bind(id)
    .bind(dto.role_name.trim())
    .fetch_optional(db)
    .await
    .map_err(map_role_name_conflict)?
    .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
}

/// The three built-in roles cannot be deleted. Users of a deleted role keep
/// their account with no role.
#[instrument(skip(db))]
pub async fn delete_role(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    if system_roles::is_system_role(&id) {
        return Err(AppError::bad_request(anyhow!(
            "System roles cannot be deleted"
        )));
    }

    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }

    Ok(())
}
