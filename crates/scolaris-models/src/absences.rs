//! Absence records taken per session.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use scolaris_core::serde::{deserialize_optional_string, deserialize_optional_uuid};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceStatus {
    #[default]
    Present,
    Absent,
    Retard,
}

impl AbsenceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Retard => "retard",
        }
    }
}

impl fmt::Display for AbsenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts any casing and surrounding whitespace. The error carries the
/// original input.
impl FromStr for AbsenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "retard" => Ok(Self::Retard),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Absence {
    pub id: Uuid,
    #[schema(example = "absent")]
    pub status: String,
    pub teacher_id: Option<Uuid>,
    pub student_id: Uuid,
    pub session_id: Uuid,
    pub justification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AbsenceWithStudent {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub absence: Absence,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StudentStatusDto {
    pub student_id: Uuid,
    pub status: Option<String>,
    pub justification: Option<String>,
}

/// Records one absence row per student of the groupe. Students missing
/// from `statuses` are marked present.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkAbsenceDto {
    pub groupe_id: Uuid,
    /// Defaults to the caller
    pub teacher_id: Option<Uuid>,
    pub session_id: Uuid,
    #[serde(default)]
    pub statuses: Vec<StudentStatusDto>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAbsenceDto {
    pub status: Option<String>,
    pub justification: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AbsenceFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub session_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAbsencesResponse {
    pub data: Vec<Absence>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AbsenceCounts {
    pub present: i64,
    pub absent: i64,
    pub retard: i64,
}

impl AbsenceCounts {
    pub fn record(&mut self, status: AbsenceStatus, count: i64) {
        match status {
            AbsenceStatus::Present => self.present += count,
            AbsenceStatus::Absent => self.absent += count,
            AbsenceStatus::Retard => self.retard += count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AbsenceCountsResponse {
    pub student_id: Uuid,
    pub counts: AbsenceCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_normalizes_input() {
        assert_eq!(" Absent ".parse::<AbsenceStatus>(), Ok(AbsenceStatus::Absent));
        assert_eq!("RETARD".parse::<AbsenceStatus>(), Ok(AbsenceStatus::Retard));
        assert_eq!("present".parse::<AbsenceStatus>(), Ok(AbsenceStatus::Present));
    }

    #[test]
    fn test_unknown_status_keeps_original_text() {
        assert_eq!("late".parse::<AbsenceStatus>(), Err("late".to_string()));
    }

    #[test]
    fn test_default_status_is_present() {
        assert_eq!(AbsenceStatus::default(), AbsenceStatus::Present);
        assert_eq!(AbsenceStatus::default().to_string(), "present");
    }

    #[test]
    fn test_counts_record() {
        let mut counts = AbsenceCounts::default();
        counts.record(AbsenceStatus::Absent, 3);
        counts.record(AbsenceStatus::Retard, 1);
        counts.record(AbsenceStatus::Absent, 1);
        assert_eq!(
            counts,
            AbsenceCounts {
                present: 0,
                absent: 4,
                retard: 1
            }
        );
    }

    #[test]
    fn test_bulk_dto_statuses_default_to_empty() {
        let dto: BulkAbsenceDto = serde_json::from_value(serde_json::json!({
            "groupe_id": Uuid::new_v4(),
            "session_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(dto.statuses.is_empty());
        assert!(dto.teacher_id.is_none());
    }
}
