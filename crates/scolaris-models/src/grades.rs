//! Grades on a 0 to 20 scale.

use chrono::{DateTime, Utc};
use scolaris_core::serde::deserialize_optional_uuid;
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const MAX_GRADE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: Uuid,
    pub grade: f64,
    pub teacher_id: Option<Uuid>,
    pub student_id: Uuid,
    pub module_id: Uuid,
    pub session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGradeDto {
    #[validate(range(min = 0.0, max = 20.0, message = "Grade must be between 0 and 20"))]
    #[schema(example = 14.5)]
    pub grade: f64,
    /// Defaults to the caller
    pub teacher_id: Option<Uuid>,
    pub student_id: Uuid,
    pub module_id: Uuid,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    #[validate(range(min = 0.0, max = 20.0, message = "Grade must be between 0 and 20"))]
    pub grade: Option<f64>,
    pub teacher_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct GradeFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub module_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub session_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedGradesResponse {
    pub data: Vec<Grade>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentAverageResponse {
    pub student_id: Uuid,
    pub average: f64,
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of `grades`, rounded to two decimals; `0.0` when empty.
pub fn average(grades: &[f64]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    round2(grades.iter().sum::<f64>() / grades.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(grade: f64) -> CreateGradeDto {
        CreateGradeDto {
            grade,
            teacher_id: None,
            student_id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            session_id: None,
        }
    }

    #[test]
    fn test_grade_bounds_are_inclusive() {
        assert!(create(0.0).validate().is_ok());
        assert!(create(20.0).validate().is_ok());
        assert!(create(12.75).validate().is_ok());
    }

    #[test]
    fn test_grade_out_of_range_is_rejected() {
        assert!(create(-0.5).validate().is_err());
        assert!(create(20.25).validate().is_err());
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[12.0, 15.0]), 13.5);
        assert_eq!(average(&[10.0, 11.0, 11.0]), 10.67);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(13.333333), 13.33);
        assert_eq!(round2(2.675_1), 2.68);
        assert_eq!(round2(40.0), 40.0);
    }
}
