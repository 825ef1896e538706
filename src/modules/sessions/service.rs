//! Session scheduling.
//!
//! A room or a teacher can only be booked by one session at a time. Writes
//! take a transaction-scoped advisory lock so that two requests cannot both
//! pass the conflict check and book the same slot.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{instrument, warn};
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::sessions::{
    AttendanceSheetResponse, CreateSessionDto, PaginatedSessionsResponse, Session,
    SessionFilterParams, TimeRange, UpdateSessionDto,
};
use scolaris_models::users::UserSummary;

use crate::metrics::track_session_conflict;
use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

/// Column list matching [`Session`].
pub const SESSION_COLUMNS: &str = "id, date, groupe_id, teacher_id, room_id, module_id, \
     start_date_time, end_date_time, session_type, created_at, updated_at";

const SCHEDULE_LOCK_KEY: i64 = 0x5343_4845_4455_4c45;

/// A bookable resource of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleResource {
    Room,
    Teacher,
}

impl ScheduleResource {
    fn column(self) -> &'static str {
        match self {
            ScheduleResource::Room => "room_id",
            ScheduleResource::Teacher => "teacher_id",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ScheduleResource::Room => "room",
            ScheduleResource::Teacher => "teacher",
        }
    }

    pub fn conflict_message(self) -> &'static str {
        match self {
            ScheduleResource::Room => "Room is not available for the selected time range.",
            ScheduleResource::Teacher => {
                "Teacher is not available during the selected time range."
            }
        }
    }
}

pub fn session_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<TimeRange, AppError> {
    TimeRange::new(start, end).ok_or_else(|| {
        AppError::bad_request(anyhow!("end_date_time must be after start_date_time"))
    })
}

fn map_session_write_error(e: sqlx::Error) -> AppError {
    map_write_error(
        e,
        "This session already exists",
        "Referenced groupe, teacher, room or module does not exist",
    )
}

/// Sessions booking `resource_id` that overlap `range`, `exclude` aside.
pub async fn overlapping_sessions(
    conn: &mut PgConnection,
    resource: ScheduleResource,
    resource_id: Uuid,
    range: TimeRange,
    exclude: Option<Uuid>,
) -> Result<Vec<Session>, AppError> {
    let sessions = sqlx::query_as::<_, Session>(&format!(
        "SELECT {SESSION_COLUMNS}
         FROM sessions
         WHERE {} = $1
           AND start_date_time < $3
           AND end_date_time > $2
           AND ($4::uuid IS NULL OR id <> $4)
         ORDER BY start_date_time",
        resource.column()
    ))
    .bind(resource_id)
    .bind(range.start)
    .bind(range.end)
    .bind(exclude)
    .fetch_all(conn)
    .await?;

    Ok(sessions)
}

/// Fails with 409 on the first booked resource. The room is checked first.
async fn ensure_free(
    conn: &mut PgConnection,
    room_id: Option<Uuid>,
    teacher_id: Option<Uuid>,
    range: TimeRange,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let checks = [
        (ScheduleResource::Room, room_id),
        (ScheduleResource::Teacher, teacher_id),
    ];

    for (resource, id) in checks {
        let Some(id) = id else { continue };
        let conflicts = overlapping_sessions(&mut *conn, resource, id, range, exclude).await?;
        if let Some(first) = conflicts.first() {
            track_session_conflict(resource.label());
            warn!(
                resource = resource.label(),
                resource_id = %id,
                conflicting_session = %first.id,
                "Schedule conflict"
            );
            return Err(AppError::conflict(anyhow!(resource.conflict_message())));
        }
    }

    Ok(())
}

async fn lock_schedule(conn: &mut PgConnection) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEDULE_LOCK_KEY)
        .execute(conn)
        .await?;
    Ok(())
}

pub struct SessionService;

impl SessionService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateSessionDto) -> Result<Session, AppError> {
        let range = session_range(dto.start_date_time, dto.end_date_time)?;

        let mut tx = db.begin().await?;
        lock_schedule(&mut tx).await?;
        ensure_free(&mut tx, Some(dto.room_id), Some(dto.teacher_id), range, None).await?;

        let session = sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions
                (date, groupe_id, teacher_id, room_id, module_id, start_date_time, end_date_time, session_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(dto.date)
        .bind(dto.groupe_id)
        .bind(dto.teacher_id)
        .bind(dto.room_id)
        .bind(dto.module_id)
        .bind(range.start)
        .bind(range.end)
        .bind(dto.session_type)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_session_write_error)?;

        tx.commit().await?;
        Ok(session)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: SessionFilterParams,
    ) -> Result<PaginatedSessionsResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(groupe_id) = filters.groupe_id {
            where_sql.push("groupe_id = ${}::uuid", groupe_id);
        }
        if let Some(teacher_id) = filters.teacher_id {
            where_sql.push("teacher_id = ${}::uuid", teacher_id);
        }
        if let Some(room_id) = filters.room_id {
            where_sql.push("room_id = ${}::uuid", room_id);
        }
        if let Some(module_id) = filters.module_id {
            where_sql.push("module_id = ${}::uuid", module_id);
        }
        if let Some(from) = filters.from {
            where_sql.push("end_date_time > ${}::timestamptz", from.to_rfc3339());
        }
        if let Some(to) = filters.to {
            where_sql.push("start_date_time < ${}::timestamptz", to.to_rfc3339());
        }

        let (data, meta) = fetch_page(
            db,
            SESSION_COLUMNS,
            "sessions",
            &where_sql,
            "start_date_time",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedSessionsResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Session not found")))
    }

    /// Merges `dto` into the stored session. Conflicts are only re-checked
    /// when the room, the teacher or the time span changes.
    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        dto: UpdateSessionDto,
    ) -> Result<Session, AppError> {
        let mut tx = db.begin().await?;
        lock_schedule(&mut tx).await?;

        let current = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Session not found")))?;

        let range = session_range(
            dto.start_date_time.unwrap_or(current.start_date_time),
            dto.end_date_time.unwrap_or(current.end_date_time),
        )?;
        let room_id = dto.room_id.or(current.room_id);
        let teacher_id = dto.teacher_id.or(current.teacher_id);

        if dto.affects_schedule() {
            ensure_free(&mut tx, room_id, teacher_id, range, Some(id)).await?;
        }

        let session = sqlx::query_as::<_, Session>(&format!(
            "UPDATE sessions SET
                date = $2,
                groupe_id = $3,
                teacher_id = $4,
                room_id = $5,
                module_id = $6,
                start_date_time = $7,
                end_date_time = $8,
                session_type = $9,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.date.unwrap_or(current.date))
        .bind(dto.groupe_id.or(current.groupe_id))
        .bind(teacher_id)
        .bind(room_id)
        .bind(dto.module_id.or(current.module_id))
        .bind(range.start)
        .bind(range.end)
        .bind(dto.session_type.unwrap_or(current.session_type))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_session_write_error)?;

        tx.commit().await?;
        Ok(session)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Session not found")));
        }

        Ok(())
    }

    /// Students of the session's groupe, by last name.
    #[instrument(skip(db))]
    pub async fn attendance_sheet(
        db: &PgPool,
        id: Uuid,
    ) -> Result<AttendanceSheetResponse, AppError> {
        let session = Self::get(db, id).await?;

        let students = match session.groupe_id {
            Some(groupe_id) => {
                sqlx::query_as::<_, UserSummary>(
                    "SELECT id, first_name, last_name, email
                     FROM users
                     WHERE groupe_id = $1
                     ORDER BY last_name, first_name",
                )
                .bind(groupe_id)
                .fetch_all(db)
                .await?
            }
            None => Vec::new(),
        };

        Ok(AttendanceSheetResponse { session, students })
    }
}
