use anyhow::anyhow;
use chrono::NaiveTime;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::events::{
    CreateEventDto, Event, EventFilterParams, PaginatedEventsResponse, UpdateEventDto,
    validate_event_times,
};

use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const EVENT_COLUMNS: &str =
    "id, name, event_type, date, start_time, end_time, room_id, created_at, updated_at";

fn map_event_write_error(e: sqlx::Error) -> AppError {
    map_write_error(
        e,
        "An event with this name already exists",
        "Room does not exist",
    )
}

fn check_times(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    validate_event_times(start, end).map_err(|e| {
        AppError::bad_request(anyhow!(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid event times".to_string())
        ))
    })
}

pub struct EventService;

impl EventService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateEventDto) -> Result<Event, AppError> {
        check_times(dto.start_time, dto.end_time)?;

        sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (name, event_type, date, start_time, end_time, room_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(dto.event_type.trim())
        .bind(dto.date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.room_id)
        .fetch_one(db)
        .await
        .map_err(map_event_write_error)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: EventFilterParams,
    ) -> Result<PaginatedEventsResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(name) = &filters.name {
            where_sql.push_ilike("name", name);
        }
        if let Some(event_type) = &filters.event_type {
            where_sql.push("event_type = ${}", event_type);
        }
        if let Some(date) = filters.date {
            where_sql.push("date = ${}::date", date);
        }
        if let Some(room_id) = filters.room_id {
            where_sql.push("room_id = ${}::uuid", room_id);
        }

        let (data, meta) = fetch_page(
            db,
            EVENT_COLUMNS,
            "events",
            &where_sql,
            "date, start_time",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedEventsResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))
    }

    /// The merged start and end times must stay ordered.
    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateEventDto) -> Result<Event, AppError> {
        if dto.start_time.is_some() || dto.end_time.is_some() {
            let current = Self::get(db, id).await?;
            check_times(
                dto.start_time.unwrap_or(current.start_time),
                dto.end_time.unwrap_or(current.end_time),
            )?;
        }

        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET
                name = COALESCE($2, name),
                event_type = COALESCE($3, event_type),
                date = COALESCE($4, date),
                start_time = COALESCE($5, start_time),
                end_time = COALESCE($6, end_time),
                room_id = COALESCE($7, room_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.event_type.as_deref().map(str::trim))
        .bind(dto.date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.room_id)
        .fetch_optional(db)
        .await
        .map_err(map_event_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Event not found")));
        }

        Ok(())
    }
}
