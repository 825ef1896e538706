use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_core::permissions::BULLETIN_READ;
use scolaris_models::bulletins::Bulletin;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::service::BulletinService;

/// Students may read their own bulletin without `bulletin:read`.
#[utoipa::path(
    get,
    path = "/api/bulletins/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Report card of the student", body = Bulletin),
        (status = 403, description = "Not the student and missing bulletin:read"),
        (status = 404, description = "Unknown student or no grades")
    ),
    tag = "Bulletins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_bulletin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Bulletin>, AppError> {
    auth.require_self_or(student_id, BULLETIN_READ)?;

    let bulletin = BulletinService::generate(&state.db, student_id).await?;
    Ok(Json(bulletin))
}
