//! Permission sets attached to roles.
//!
//! Each row stores a `TEXT[]` of `section:action` tokens. A role may own
//! several sets; the effective permissions of a role are their union.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RolePermissionSet {
    pub id: Uuid,
    pub description: Option<String>,
    pub permissions_allowed: Vec<String>,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionSetDto {
    pub role_id: Uuid,
    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    pub description: Option<String>,
    #[schema(example = json!(["grade:read", "grade:create"]))]
    pub permissions_allowed: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePermissionSetDto {
    pub role_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    pub description: Option<String>,
    pub permissions_allowed: Option<Vec<String>>,
}

/// Body of the add/remove single permission endpoints.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PermissionTokenDto {
    #[validate(length(min = 1, message = "Permission is required"))]
    #[schema(example = "room:update")]
    pub permission: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_token_dto_requires_value() {
        assert!(
            PermissionTokenDto {
                permission: String::new()
            }
            .validate()
            .is_err()
        );
        assert!(
            PermissionTokenDto {
                permission: "room:read".to_string()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_create_dto_deserializes_token_array() {
        let dto: CreatePermissionSetDto = serde_json::from_value(serde_json::json!({
            "role_id": "00000000-0000-0000-0000-000000000002",
            "permissions_allowed": ["grade:read", "grade:create"]
        }))
        .unwrap();
        assert!(dto.description.is_none());
        assert_eq!(dto.permissions_allowed.len(), 2);
    }
}
