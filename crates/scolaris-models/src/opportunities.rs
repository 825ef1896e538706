//! Internship and job offers published to students.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use scolaris_core::serde::deserialize_optional_string;
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OpportunityType {
    #[serde(rename = "stage")]
    Stage,
    #[serde(rename = "offre d'emploi")]
    OffreEmploi,
}

impl OpportunityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::OffreEmploi => "offre d'emploi",
        }
    }
}

impl FromStr for OpportunityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stage" => Ok(Self::Stage),
            "offre d'emploi" => Ok(Self::OffreEmploi),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Opportunity {
    pub id: Uuid,
    pub title: String,
    #[schema(example = "stage")]
    pub opportunity_type: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub profile: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOpportunityDto {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    /// `stage` or `offre d'emploi`
    pub opportunity_type: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 255, message = "Company is required"))]
    pub company: String,
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "Profile is required"))]
    pub profile: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOpportunityDto {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: Option<String>,
    pub opportunity_type: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Company is required"))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: Option<String>,
    #[validate(length(min = 1, message = "Profile is required"))]
    pub profile: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct OpportunityFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub opportunity_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub company: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedOpportunitiesResponse {
    pub data: Vec<Opportunity>,
    pub meta: PaginationMeta,
}
