use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::grades::{
    CreateGradeDto, Grade, GradeFilterParams, PaginatedGradesResponse, StudentAverageResponse,
    UpdateGradeDto, average,
};

use crate::utils::db::{SqlFilters, fetch_page, map_write_error};

const GRADE_COLUMNS: &str =
    "id, grade, teacher_id, student_id, module_id, session_id, created_at, updated_at";

fn map_grade_write_error(e: sqlx::Error) -> AppError {
    map_write_error(
        e,
        "This grade already exists",
        "Referenced student, teacher, module or session does not exist",
    )
}

pub struct GradeService;

impl GradeService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateGradeDto) -> Result<Grade, AppError> {
        sqlx::query_as::<_, Grade>(&format!(
            "INSERT INTO grades (grade, teacher_id, student_id, module_id, session_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {GRADE_COLUMNS}"
        ))
        .bind(dto.grade)
        .bind(dto.teacher_id)
        .bind(dto.student_id)
        .bind(dto.module_id)
        .bind(dto.session_id)
        .fetch_one(db)
        .await
        .map_err(map_grade_write_error)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: GradeFilterParams,
    ) -> Result<PaginatedGradesResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(student_id) = filters.student_id {
            where_sql.push("student_id = ${}::uuid", student_id);
        }
        if let Some(module_id) = filters.module_id {
            where_sql.push("module_id = ${}::uuid", module_id);
        }
        if let Some(session_id) = filters.session_id {
            where_sql.push("session_id = ${}::uuid", session_id);
        }

        let (data, meta) = fetch_page(
            db,
            GRADE_COLUMNS,
            "grades",
            &where_sql,
            "created_at DESC",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedGradesResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Grade, AppError> {
        sqlx::query_as::<_, Grade>(&format!("SELECT {GRADE_COLUMNS} FROM grades WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateGradeDto) -> Result<Grade, AppError> {
        sqlx::query_as::<_, Grade>(&format!(
            "UPDATE grades SET
                grade = COALESCE($2, grade),
                teacher_id = COALESCE($3, teacher_id),
                student_id = COALESCE($4, student_id),
                module_id = COALESCE($5, module_id),
                session_id = COALESCE($6, session_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {GRADE_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.grade)
        .bind(dto.teacher_id)
        .bind(dto.student_id)
        .bind(dto.module_id)
        .bind(dto.session_id)
        .fetch_optional(db)
        .await
        .map_err(map_grade_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Grade not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn for_student(db: &PgPool, student_id: Uuid) -> Result<Vec<Grade>, AppError> {
        let grades = sqlx::query_as::<_, Grade>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades WHERE student_id = $1 ORDER BY created_at"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(grades)
    }

    /// Mean of all the student's grades, 0 when there are none.
    #[instrument(skip(db))]
    pub async fn student_average(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<StudentAverageResponse, AppError> {
        let values =
            sqlx::query_scalar::<_, f64>("SELECT grade FROM grades WHERE student_id = $1")
                .bind(student_id)
                .fetch_all(db)
                .await?;

        Ok(StudentAverageResponse {
            student_id,
            average: average(&values),
        })
    }

    #[instrument(skip(db))]
    pub async fn for_module(db: &PgPool, module_id: Uuid) -> Result<Vec<Grade>, AppError> {
        let grades = sqlx::query_as::<_, Grade>(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades WHERE module_id = $1 ORDER BY created_at"
        ))
        .bind(module_id)
        .fetch_all(db)
        .await?;

        if grades.is_empty() {
            return Err(AppError::not_found(anyhow!(
                "No grades found for this module"
            )));
        }

        Ok(grades)
    }
}
