//! Sessions (séances): scheduled teaching slots.
//!
//! A session ties a module, a teacher, a room and a groupe to a time span.
//! Time spans are half-open: a session ending at 10:00 does not overlap one
//! starting at 10:00.

use chrono::{DateTime, NaiveDate, Utc};
use scolaris_core::serde::deserialize_optional_uuid;
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::users::UserSummary;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "session_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Normal,
    Exam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Session {
    pub id: Uuid,
    pub date: NaiveDate,
    pub groupe_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub session_type: SessionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A half-open `[start, end)` interval with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Returns `None` unless `end` is strictly after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Mirrors the SQL predicate used by the conflict queries.
    #[cfg(test)]
    fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSessionDto {
    pub date: NaiveDate,
    pub groupe_id: Uuid,
    pub teacher_id: Uuid,
    pub room_id: Uuid,
    pub module_id: Uuid,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub session_type: SessionType,
}

/// Partial update, merged with the stored session.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSessionDto {
    pub date: Option<NaiveDate>,
    pub groupe_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub session_type: Option<SessionType>,
}

impl UpdateSessionDto {
    /// Whether the update can change the outcome of the conflict checks.
    pub fn affects_schedule(&self) -> bool {
        self.room_id.is_some()
            || self.teacher_id.is_some()
            || self.start_date_time.is_some()
            || self.end_date_time.is_some()
    }
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SessionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub groupe_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub teacher_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub room_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub module_id: Option<Uuid>,
    /// Sessions ending after this instant
    pub from: Option<DateTime<Utc>>,
    /// Sessions starting before this instant
    pub to: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSessionsResponse {
    pub data: Vec<Session>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSheetResponse {
    pub session: Session,
    pub students: Vec<UserSummary>,
}
