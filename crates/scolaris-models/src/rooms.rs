//! Rooms and their availability.

use chrono::{DateTime, Utc};
use scolaris_core::serde::{
    deserialize_optional_bool, deserialize_optional_i32, deserialize_optional_string,
};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::sessions::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Room {
    pub id: Uuid,
    pub room_number: String,
    pub capacity: i32,
    pub room_type: String,
    pub facility: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomDto {
    #[validate(length(
        min = 1,
        max = 155,
        message = "Room number must be between 1 and 155 characters"
    ))]
    #[schema(example = "B-204")]
    pub room_number: String,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    #[validate(length(min = 1, max = 255, message = "Room type is required"))]
    #[schema(example = "Salle TP")]
    pub room_type: String,
    #[validate(length(min = 1, max = 255, message = "Facility is required"))]
    #[schema(example = "Projecteur, 30 postes")]
    pub facility: String,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomDto {
    #[validate(length(
        min = 1,
        max = 155,
        message = "Room number must be between 1 and 155 characters"
    ))]
    pub room_number: Option<String>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "Room type is required"))]
    pub room_type: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Facility is required"))]
    pub facility: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct RoomFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub room_number: Option<String>,
    /// Minimum capacity
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub capacity: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub room_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub facility: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_available: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedRoomsResponse {
    pub data: Vec<Room>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomAvailabilityResponse {
    pub room_id: Uuid,
    pub available: bool,
    pub conflicts: Vec<Session>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_room_requires_positive_capacity() {
        let mut dto = CreateRoomDto {
            room_number: "A-101".to_string(),
            capacity: 40,
            room_type: "Amphi".to_string(),
            facility: "Projecteur".to_string(),
            is_available: None,
        };
        assert!(dto.validate().is_ok());
        dto.capacity = 0;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_room_filter_params() {
        let params: RoomFilterParams = serde_json::from_str(
            r#"{"capacity": "30", "is_available": "true", "facility": "proj", "page": "2"}"#,
        )
        .unwrap();
        assert_eq!(params.capacity, Some(30));
        assert_eq!(params.is_available, Some(true));
        assert_eq!(params.pagination.page(), Some(2));
    }
}
