//! Groupes (classes) inside a niveau.

use chrono::{DateTime, Utc};
use scolaris_core::serde::deserialize_optional_uuid;
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::users::UserSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Groupe {
    pub id: Uuid,
    pub groupe_name: String,
    pub niveau_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupeDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Groupe name must be between 1 and 100 characters"
    ))]
    #[schema(example = "GI-1A")]
    pub groupe_name: String,
    pub niveau_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupeDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Groupe name must be between 1 and 100 characters"
    ))]
    pub groupe_name: Option<String>,
    pub niveau_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct GroupeFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub niveau_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedGroupesResponse {
    pub data: Vec<Groupe>,
    pub meta: PaginationMeta,
}

/// Users assigned to a groupe.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupeMembersResponse {
    pub groupe: Groupe,
    pub membres: Vec<UserSummary>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_groupe_dto_validation() {
        let dto = CreateGroupeDto {
            groupe_name: "GI-1A".to_string(),
            niveau_id: Uuid::new_v4(),
        };
        assert!(dto.validate().is_ok());

        let dto = CreateGroupeDto {
            groupe_name: String::new(),
            niveau_id: Uuid::new_v4(),
        };
        assert!(dto.validate().is_err());
    }
}
