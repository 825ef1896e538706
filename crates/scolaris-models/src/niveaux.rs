//! Niveaux (levels) inside a filiere.

use chrono::{DateTime, Utc};
use scolaris_core::serde::{deserialize_optional_string, deserialize_optional_uuid};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Niveau {
    pub id: Uuid,
    pub name: String,
    pub filiere_id: Uuid,
    pub academic_year: String,
    pub credits_required: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNiveauDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[schema(example = "Première année")]
    pub name: String,
    pub filiere_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "Academic year is required"))]
    #[schema(example = "2024-2025")]
    pub academic_year: String,
    #[validate(range(min = 0, message = "Credits required must be zero or more"))]
    pub credits_required: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateNiveauDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,
    pub filiere_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "Academic year is required"))]
    pub academic_year: Option<String>,
    #[validate(range(min = 0, message = "Credits required must be zero or more"))]
    pub credits_required: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct NiveauFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub filiere_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedNiveauxResponse {
    pub data: Vec<Niveau>,
    pub meta: PaginationMeta,
}
