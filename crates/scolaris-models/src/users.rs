//! User domain models and DTOs.
//!
//! The `users` table holds every account (admins, teachers and students).
//! Password hashes and 2FA secrets never leave the service layer: [`User`]
//! only carries the public columns, selected through [`USER_COLUMNS`].

use chrono::{DateTime, NaiveDate, Utc};
use scolaris_core::serde::{deserialize_optional_string, deserialize_optional_uuid};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Column list matching [`User`].
pub const USER_COLUMNS: &str = "id, first_name, last_name, email, birth_date, phone_number, \
     address, zip_code, is_active, email_verified, two_factor_enabled, role_id, groupe_id, \
     filiere_id, created_at, updated_at";

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    pub two_factor_enabled: bool,
    pub role_id: Option<Uuid>,
    pub groupe_id: Option<Uuid>,
    pub filiere_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Minimal user projection used in rosters and attendance sheets.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Profile update.
///
/// Any authenticated user may change their own profile fields. The
/// assignment fields (`role_id`, `groupe_id`, `filiere_id`, `is_active`)
/// additionally require `user:update`.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "First name must be between 1 and 100 characters"
    ))]
    pub first_name: Option<String>,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Last name must be between 1 and 100 characters"
    ))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 20, message = "Phone number must not exceed 20 characters"))]
    pub phone_number: Option<String>,
    #[validate(length(max = 255, message = "Address must not exceed 255 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 10, message = "Zip code must not exceed 10 characters"))]
    pub zip_code: Option<String>,
    pub role_id: Option<Uuid>,
    pub groupe_id: Option<Uuid>,
    pub filiere_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl UpdateUserDto {
    /// Whether the update touches fields reserved to user managers.
    pub fn touches_assignments(&self) -> bool {
        self.role_id.is_some()
            || self.groupe_id.is_some()
            || self.filiere_id.is_some()
            || self.is_active.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct UserFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub role_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub groupe_id: Option<Uuid>,
    /// Matches first name, last name or email (case-insensitive)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_dto_valid() {
        let dto = UpdateUserDto {
            first_name: Some("Salma".to_string()),
            email: Some("salma@scolaris.ma".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
        assert!(!dto.touches_assignments());
    }

    #[test]
    fn test_update_user_dto_rejects_bad_email() {
        let dto = UpdateUserDto {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_user_dto_rejects_empty_name() {
        let dto = UpdateUserDto {
            last_name: Some(String::new()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_assignment_fields_are_detected() {
        let dto = UpdateUserDto {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(dto.touches_assignments());

        let dto = UpdateUserDto {
            groupe_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(dto.touches_assignments());
    }

    #[test]
    fn test_filter_params_treat_empty_strings_as_absent() {
        let params: UserFilterParams =
            serde_json::from_str(r#"{"role_id": "", "search": "  ", "limit": "5"}"#).unwrap();
        assert!(params.role_id.is_none());
        assert!(params.search.is_none());
        assert_eq!(params.pagination.limit(), 5);
    }

    #[test]
    fn test_user_columns_match_struct_fields() {
        for column in [
            "id",
            "email",
            "two_factor_enabled",
            "groupe_id",
            "filiere_id",
            "updated_at",
        ] {
            assert!(USER_COLUMNS.contains(column), "{column}");
        }
        assert!(!USER_COLUMNS.contains("password"));
        assert!(!USER_COLUMNS.contains("two_factor_secret"));
    }
}
