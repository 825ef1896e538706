//! Role models and the well-known system roles.

use chrono::{DateTime, Utc};
use scolaris_core::serde::deserialize_optional_string;
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role together with the union of its permission sets.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Role name must be between 1 and 100 characters"
    ))]
    pub role_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Role name must be between 1 and 100 characters"
    ))]
    pub role_name: String,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct RoleFilterParams {
    /// Search by name
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub role_name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedRolesResponse {
    pub data: Vec<Role>,
    pub meta: PaginationMeta,
}

/// Roles created by the initial migration. Their ids are fixed so the
/// application can assign them without a lookup.
pub mod system_roles {
    use uuid::Uuid;

    pub mod names {
        pub const ADMIN: &str = "Admin";
        pub const TEACHER: &str = "Teacher";
        pub const STUDENT: &str = "Student";
    }

    pub const ADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000001);
    pub const TEACHER: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000002);
    pub const STUDENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000003);

    pub fn all() -> [Uuid; 3] {
        [ADMIN, TEACHER, STUDENT]
    }

    pub fn is_system_role(id: &Uuid) -> bool {
        all().contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_role_ids() {
        assert_eq!(
            system_roles::ADMIN.to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            system_roles::TEACHER.to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
        assert_eq!(
            system_roles::STUDENT.to_string(),
            "00000000-0000-0000-0000-000000000003"
        );
    }

    #[test]
    fn test_is_system_role() {
        assert!(system_roles::is_system_role(&system_roles::STUDENT));
        assert!(!system_roles::is_system_role(&Uuid::new_v4()));
    }

    #[test]
    fn test_create_role_dto_validation() {
        assert!(
            CreateRoleDto {
                role_name: "Secretary".to_string()
            }
            .validate()
            .is_ok()
        );
        assert!(
            CreateRoleDto {
                role_name: String::new()
            }
            .validate()
            .is_err()
        );
        assert!(
            CreateRoleDto {
                role_name: "x".repeat(101)
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_role_with_permissions_flattens_role() {
        let now = Utc::now();
        let value = serde_json::to_value(RoleWithPermissions {
            role: Role {
                id: system_roles::TEACHER,
                role_name: "Teacher".to_string(),
                created_at: now,
                updated_at: now,
            },
            permissions: vec!["grade:create".to_string()],
        })
        .unwrap();
        assert_eq!(value["role_name"], "Teacher");
        assert_eq!(value["permissions"][0], "grade:create");
    }
}
