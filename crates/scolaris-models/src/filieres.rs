//! Filieres (programs), the top of the academic hierarchy.

use chrono::{DateTime, Utc};
use scolaris_core::serde::{deserialize_optional_bool, deserialize_optional_string};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Filiere {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFiliereDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    #[schema(example = "Génie Informatique")]
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFiliereDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct FiliereFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedFilieresResponse {
    pub data: Vec<Filiere>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_filiere_dto_validation() {
        let dto = CreateFiliereDto {
            name: "Génie Civil".to_string(),
            description: None,
            is_active: None,
        };
        assert!(dto.validate().is_ok());

        let dto = CreateFiliereDto {
            name: String::new(),
            description: None,
            is_active: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_filter_params_parse_bool_strings() {
        let params: FiliereFilterParams =
            serde_json::from_str(r#"{"is_active": "false", "name": ""}"#).unwrap();
        assert_eq!(params.is_active, Some(false));
        assert!(params.name.is_none());
    }
}
