use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::rooms::{
    AvailabilityQuery, CreateRoomDto, PaginatedRoomsResponse, Room, RoomAvailabilityResponse,
    RoomFilterParams, UpdateRoomDto,
};
use scolaris_models::sessions::TimeRange;

use crate::modules::sessions::service::{ScheduleResource, overlapping_sessions};
use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const ROOM_COLUMNS: &str =
    "id, room_number, capacity, room_type, facility, is_available, created_at, updated_at";
const ROOM_NUMBER_TAKEN: &str = "A room with this number already exists";

pub fn availability_range(query: &AvailabilityQuery) -> Result<TimeRange, AppError> {
    let (Some(start), Some(end)) = (query.start, query.end) else {
        return Err(AppError::bad_request(anyhow!("start and end are required")));
    };

    TimeRange::new(start, end)
        .ok_or_else(|| AppError::bad_request(anyhow!("end must be after start")))
}

pub struct RoomService;

impl RoomService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateRoomDto) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>(&format!(
            "INSERT INTO rooms (room_number, capacity, room_type, facility, is_available)
             VALUES ($1, $2, $3, $4, COALESCE($5, TRUE))
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(dto.room_number.trim())
        .bind(dto.capacity)
        .bind(dto.room_type.trim())
        .bind(dto.facility.trim())
        .bind(dto.is_available)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, ROOM_NUMBER_TAKEN, ROOM_NUMBER_TAKEN))
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: RoomFilterParams,
    ) -> Result<PaginatedRoomsResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(room_number) = &filters.room_number {
            where_sql.push_ilike("room_number", room_number);
        }
        if let Some(capacity) = filters.capacity {
            where_sql.push("capacity >= ${}::int", capacity);
        }
        if let Some(room_type) = &filters.room_type {
            where_sql.push("room_type = ${}", room_type);
        }
        if let Some(facility) = &filters.facility {
            where_sql.push_ilike("facility", facility);
        }
        if let Some(is_available) = filters.is_available {
            where_sql.push("is_available = ${}::boolean", is_available);
        }

        let (data, meta) = fetch_page(
            db,
            ROOM_COLUMNS,
            "rooms",
            &where_sql,
            "room_number",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedRoomsResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Room not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateRoomDto) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>(&format!(
            "UPDATE rooms SET
                room_number = COALESCE($2, room_number),
                capacity = COALESCE($3, capacity),
                room_type = COALESCE($4, room_type),
                facility = COALESCE($5, facility),
                is_available = COALESCE($6, is_available),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.room_number.as_deref().map(str::trim))
        .bind(dto.capacity)
        .bind(dto.room_type.as_deref().map(str::trim))
        .bind(dto.facility.as_deref().map(str::trim))
        .bind(dto.is_available)
        .fetch_optional(db)
        .await
        .map_err(|e| map_write_error(e, ROOM_NUMBER_TAKEN, ROOM_NUMBER_TAKEN))?
        .ok_or_else(|| AppError::not_found(anyhow!("Room not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Room not found")));
        }

        Ok(())
    }

    /// A room is available when it is not flagged out of service and no
    /// session books it during the requested span.
    #[instrument(skip(db))]
    pub async fn availability(
        db: &PgPool,
        id: Uuid,
        query: AvailabilityQuery,
    ) -> Result<RoomAvailabilityResponse, AppError> {
        let range = availability_range(&query)?;
        let room = Self::get(db, id).await?;

        let mut conn = db.acquire().await?;
        let conflicts =
            overlapping_sessions(&mut conn, ScheduleResource::Room, room.id, range, None).await?;

        Ok(RoomAvailabilityResponse {
            room_id: room.id,
            available: room.is_available && conflicts.is_empty(),
            conflicts,
        })
    }
}
