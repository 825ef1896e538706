//! Absence tracking.
//!
//! Roll call for a session is taken in one bulk request: every student of the
//! groupe gets a row, `present` unless the request says otherwise.

use std::collections::HashMap;

use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::absences::{
    Absence, AbsenceCounts, AbsenceCountsResponse, AbsenceFilterParams, AbsenceStatus,
    AbsenceWithStudent, BulkAbsenceDto, PaginatedAbsencesResponse, StudentStatusDto,
    UpdateAbsenceDto,
};
use scolaris_models::users::UserSummary;

use crate::modules::groupes::service::GroupeService;
use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const ABSENCE_COLUMNS: &str =
    "id, status, teacher_id, student_id, session_id, justification, created_at, updated_at";

fn parse_status(raw: &str) -> Result<AbsenceStatus, AppError> {
    raw.parse::<AbsenceStatus>()
        .map_err(|s| AppError::bad_request(anyhow!("Invalid status: {}", s)))
}

/// A roll call row before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollCallEntry {
    pub student_id: Uuid,
    pub status: AbsenceStatus,
    pub justification: Option<String>,
}

/// One entry per student, in roster order. Statuses for students outside the
/// roster are ignored, but every given status must be valid.
pub fn roll_call(
    students: &[UserSummary],
    statuses: &[StudentStatusDto],
) -> Result<Vec<RollCallEntry>, AppError> {
    let mut given: HashMap<Uuid, (AbsenceStatus, Option<String>)> = HashMap::new();
    for entry in statuses {
        let status = match entry.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => AbsenceStatus::default(),
        };
        given.insert(entry.student_id, (status, entry.justification.clone()));
    }

    Ok(students
        .iter()
        .map(|student| {
            let (status, justification) = given.remove(&student.id).unwrap_or_default();
            RollCallEntry {
                student_id: student.id,
                status,
                justification,
            }
        })
        .collect())
}

pub struct AbsenceService;

impl AbsenceService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: AbsenceFilterParams,
    ) -> Result<PaginatedAbsencesResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(student_id) = filters.student_id {
            where_sql.push("student_id = ${}::uuid", student_id);
        }
        if let Some(session_id) = filters.session_id {
            where_sql.push("session_id = ${}::uuid", session_id);
        }
        if let Some(status) = &filters.status {
            where_sql.push("status = ${}", parse_status(status)?);
        }

        let (data, meta) = fetch_page(
            db,
            ABSENCE_COLUMNS,
            "absences",
            &where_sql,
            "created_at DESC",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedAbsencesResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn groupe_students(
        db: &PgPool,
        groupe_id: Uuid,
    ) -> Result<Vec<UserSummary>, AppError> {
        GroupeService::get(db, groupe_id).await?;

        let students = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name, email
             FROM users
             WHERE groupe_id = $1
             ORDER BY last_name, first_name",
        )
        .bind(groupe_id)
        .fetch_all(db)
        .await?;

        Ok(students)
    }

    /// Records the roll call of a session with one multi-row INSERT.
    #[instrument(skip(db, dto), fields(groupe_id = %dto.groupe_id, session_id = %dto.session_id))]
    pub async fn bulk_create(db: &PgPool, dto: BulkAbsenceDto) -> Result<Vec<Absence>, AppError> {
        let students = Self::groupe_students(db, dto.groupe_id).await?;
        if students.is_empty() {
            return Err(AppError::bad_request(anyhow!(
                "No students found in this groupe"
            )));
        }

        let entries = roll_call(&students, &dto.statuses)?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO absences (status, teacher_id, student_id, session_id, justification) ",
        );
        builder.push_values(&entries, |mut row, entry| {
            row.push_bind(entry.status.as_str())
                .push_bind(dto.teacher_id)
                .push_bind(entry.student_id)
                .push_bind(dto.session_id)
                .push_bind(entry.justification.as_deref());
        });
        builder.push(" RETURNING ");
        builder.push(ABSENCE_COLUMNS);

        // a single statement stores the whole roll call or none of it
        let created = builder
            .build_query_as::<Absence>()
            .fetch_all(db)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    "Absence already recorded",
                    "Referenced session or teacher does not exist",
                )
            })?;

        info!(count = created.len(), "Roll call recorded");
        Ok(created)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<AbsenceWithStudent, AppError> {
        sqlx::query_as::<_, AbsenceWithStudent>(
            "SELECT
                a.id, a.status, a.teacher_id, a.student_id, a.session_id, a.justification,
                a.created_at, a.updated_at,
                u.first_name, u.last_name, u.email
             FROM absences a
             JOIN users u ON u.id = a.student_id
             WHERE a.id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Absence not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateAbsenceDto) -> Result<Absence, AppError> {
        if dto.status.is_none() && dto.justification.is_none() {
            return Err(AppError::bad_request(anyhow!("Nothing to update")));
        }

        let status = dto.status.as_deref().map(parse_status).transpose()?;

        sqlx::query_as::<_, Absence>(&format!(
            "UPDATE absences SET
                status = COALESCE($2, status),
                justification = COALESCE($3, justification),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ABSENCE_COLUMNS}"
        ))
        .bind(id)
        .bind(status.map(AbsenceStatus::as_str))
        .bind(&dto.justification)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Absence not found")))
    }

    #[instrument(skip(db))]
    pub async fn counts(db: &PgPool, student_id: Uuid) -> Result<AbsenceCountsResponse, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM absences WHERE student_id = $1 GROUP BY status",
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        let mut counts = AbsenceCounts::default();
        for (status, count) in rows {
            if let Ok(status) = status.parse::<AbsenceStatus>() {
                counts.record(status, count);
            }
        }

        Ok(AbsenceCountsResponse { student_id, counts })
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM absences WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Absence not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn student(last_name: &str) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            first_name: "Sara".to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@scolaris.ma", last_name.to_lowercase()),
        }
    }

    fn status(student_id: Uuid, status: Option<&str>) -> StudentStatusDto {
        StudentStatusDto {
            student_id,
            status: status.map(str::to_string),
            justification: None,
        }
    }

    #[test]
    fn test_roll_call_defaults_to_present() {
        let roster = vec![student("Bennani"), student("Chraibi")];
        let entries = roll_call(&roster, &[status(roster[1].id, Some(" ABSENT "))]).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, AbsenceStatus::Present);
        assert_eq!(entries[1].status, AbsenceStatus::Absent);
        assert_eq!(entries[1].student_id, roster[1].id);
    }

    #[test]
    fn test_roll_call_ignores_students_outside_roster() {
        let roster = vec![student("Bennani")];
        let entries = roll_call(&roster, &[status(Uuid::new_v4(), Some("retard"))]).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, AbsenceStatus::Present);
    }

    #[test]
    fn test_roll_call_rejects_unknown_status() {
        let roster = vec![student("Bennani")];
        let err = roll_call(&roster, &[status(roster[0].id, Some("late"))]).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Invalid status: late");
    }

    #[test]
    fn test_entry_without_status_is_present_with_justification() {
        let roster = vec![student("Bennani")];
        let entry = StudentStatusDto {
            student_id: roster[0].id,
            status: None,
            justification: Some("Certificat médical".to_string()),
        };
        let entries = roll_call(&roster, &[entry]).unwrap();
        assert_eq!(entries[0].status, AbsenceStatus::Present);
        assert_eq!(
            entries[0].justification.as_deref(),
            Some("Certificat médical")
        );
    }
}
