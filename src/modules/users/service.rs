use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_config::JwtConfig;
use scolaris_core::AppError;
use scolaris_models::users::{PaginatedUsersResponse, UpdateUserDto, UserFilterParams};
use scolaris_models::{USER_COLUMNS, User};

use crate::modules::auth::service::{AuthService, normalize_email};
use crate::utils::db::{SqlFilters, fetch_page, map_write_error};
use crate::utils::email::EmailService;

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(role_id) = filters.role_id {
            where_sql.push("role_id = ${}::uuid", role_id);
        }
        if let Some(groupe_id) = filters.groupe_id {
            where_sql.push("groupe_id = ${}::uuid", groupe_id);
        }
        if let Some(search) = &filters.search {
            where_sql.push(
                "(first_name ILIKE ${} OR last_name ILIKE ${} OR email ILIKE ${})",
                format!("%{}%", search),
            );
        }

        let (data, meta) = fetch_page(
            db,
            USER_COLUMNS,
            "users",
            &where_sql,
            "last_name, first_name",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedUsersResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Applies a profile update. Assignment fields must have been authorized
    /// by the caller. A new email address resets `email_verified` and a new
    /// verification link is sent.
    #[instrument(skip(db, email, jwt_config))]
    pub async fn update(
        db: &PgPool,
        email: &EmailService,
        id: Uuid,
        dto: UpdateUserDto,
        jwt_config: &JwtConfig,
    ) -> Result<User, AppError> {
        let current = Self::get(db, id).await?;

        let new_email = dto
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| *e != current.email);

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                email_verified = CASE WHEN $4 IS NULL THEN email_verified ELSE FALSE END,
                birth_date = COALESCE($5, birth_date),
                phone_number = COALESCE($6, phone_number),
                address = COALESCE($7, address),
                zip_code = COALESCE($8, zip_code),
                role_id = COALESCE($9, role_id),
                groupe_id = COALESCE($10, groupe_id),
                filiere_id = COALESCE($11, filiere_id),
                is_active = COALESCE($12, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&new_email)
        .bind(dto.birth_date)
        .bind(&dto.phone_number)
        .bind(&dto.address)
        .bind(&dto.zip_code)
        .bind(dto.role_id)
        .bind(dto.groupe_id)
        .bind(dto.filiere_id)
        .bind(dto.is_active)
        .fetch_one(db)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "This email is already in use",
                "Referenced role, groupe or filiere does not exist",
            )
        })?;

        if new_email.is_some() {
            AuthService::send_verification_link(db, email, &user, jwt_config).await?;
        }

        Ok(user)
    }

    /// Soft delete: the account is deactivated, its data is kept.
    #[instrument(skip(db))]
    pub async fn deactivate(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let user = Self::get(db, id).await?;
        if !user.is_active {
            return Err(AppError::bad_request(anyhow!("User is already inactive")));
        }

        sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
