//! Course modules: the teaching units graded in bulletins.

use chrono::{DateTime, NaiveDate, Utc};
use scolaris_core::serde::{
    deserialize_optional_i32, deserialize_optional_string, deserialize_optional_uuid,
};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::sessions::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseModule {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub credits: i32,
    pub credit_required: i32,
    pub niveau_id: Uuid,
    pub filiere_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateModuleDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    #[schema(example = "Algorithmique avancée")]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Credits must be at least 1"))]
    pub credits: i32,
    #[validate(range(min = 0, message = "Credit required must be zero or more"))]
    pub credit_required: i32,
    pub niveau_id: Uuid,
    pub filiere_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateModuleDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Credits must be at least 1"))]
    pub credits: Option<i32>,
    #[validate(range(min = 0, message = "Credit required must be zero or more"))]
    pub credit_required: Option<i32>,
    pub niveau_id: Option<Uuid>,
    pub filiere_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ModuleFilterParams {
    /// Case-insensitive substring match
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub credits: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub credit_required: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub niveau_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub filiere_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedModulesResponse {
    pub data: Vec<CourseModule>,
    pub meta: PaginationMeta,
}

/// Both bounds are inclusive and required.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ScheduleQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleScheduleResponse {
    pub module_id: Uuid,
    pub total_sessions: usize,
    pub sessions: Vec<Session>,
}
