use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::bulletins::{Bulletin, BulletinGradeRow, compute_bulletin};
use scolaris_models::users::UserSummary;

pub struct BulletinService;

impl BulletinService {
    #[instrument(skip(db))]
    pub async fn generate(db: &PgPool, student_id: Uuid) -> Result<Bulletin, AppError> {
        let student = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let rows = sqlx::query_as::<_, BulletinGradeRow>(
            "SELECT
                m.id AS module_id,
                m.title AS module_title,
                m.credits,
                m.credit_required,
                g.grade
             FROM grades g
             JOIN modules m ON m.id = g.module_id
             WHERE g.student_id = $1",
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        let results = compute_bulletin(&rows)
            .ok_or_else(|| AppError::not_found(anyhow!("No grades found for this student")))?;

        Ok(results.into_bulletin(student))
    }
}
