use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::opportunities::{
    CreateOpportunityDto, Opportunity, OpportunityFilterParams, PaginatedOpportunitiesResponse,
    UpdateOpportunityDto,
};

use crate::middleware::auth::{
    AuthUser, RequireOpportunityCreate, RequireOpportunityDelete, RequireOpportunityUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::OpportunityService;

#[utoipa::path(
    post,
    path = "/api/opportunities",
    request_body = CreateOpportunityDto,
    responses(
        (status = 201, description = "Opportunity published", body = Opportunity),
        (status = 400, description = "Invalid opportunity type"),
        (status = 422, description = "Validation error")
    ),
    tag = "Opportunities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_opportunity(
    State(state): State<AppState>,
    _auth: RequireOpportunityCreate,
    ValidatedJson(dto): ValidatedJson<CreateOpportunityDto>,
) -> Result<(StatusCode, Json<Opportunity>), AppError> {
    let opportunity = OpportunityService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

#[utoipa::path(
    get,
    path = "/api/opportunities",
    params(OpportunityFilterParams),
    responses(
        (status = 200, description = "Paginated opportunities, newest first", body = PaginatedOpportunitiesResponse)
    ),
    tag = "Opportunities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_opportunities(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filters): Query<OpportunityFilterParams>,
) -> Result<Json<PaginatedOpportunitiesResponse>, AppError> {
    let opportunities = OpportunityService::list(&state.db, filters).await?;
    Ok(Json(opportunities))
}

#[utoipa::path(
    get,
    path = "/api/opportunities/{id}",
    params(("id" = Uuid, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Opportunity", body = Opportunity),
        (status = 404, description = "Opportunity not found")
    ),
    tag = "Opportunities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_opportunity(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Opportunity>, AppError> {
    let opportunity = OpportunityService::get(&state.db, id).await?;
    Ok(Json(opportunity))
}

#[utoipa::path(
    put,
    path = "/api/opportunities/{id}",
    params(("id" = Uuid, Path, description = "Opportunity ID")),
    request_body = UpdateOpportunityDto,
    responses(
        (status = 200, description = "Opportunity updated", body = Opportunity),
        (status = 400, description = "Invalid opportunity type"),
        (status = 404, description = "Opportunity not found")
    ),
    tag = "Opportunities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_opportunity(
    State(state): State<AppState>,
    _auth: RequireOpportunityUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateOpportunityDto>,
) -> Result<Json<Opportunity>, AppError> {
    let opportunity = OpportunityService::update(&state.db, id, dto).await?;
    Ok(Json(opportunity))
}

#[utoipa::path(
    delete,
    path = "/api/opportunities/{id}",
    params(("id" = Uuid, Path, description = "Opportunity ID")),
    responses(
        (status = 204, description = "Opportunity deleted"),
        (status = 404, description = "Opportunity not found")
    ),
    tag = "Opportunities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_opportunity(
    State(state): State<AppState>,
    _auth: RequireOpportunityDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    OpportunityService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
