use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::events::{
    CreateEventDto, Event, EventFilterParams, PaginatedEventsResponse, UpdateEventDto,
};

use crate::middleware::auth::{
    RequireEventCreate, RequireEventDelete, RequireEventRead, RequireEventUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::EventService;

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "end_time must be after start_time"),
        (status = 409, description = "Name already in use"),
        (status = 422, description = "Validation error")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_event(
    State(state): State<AppState>,
    _auth: RequireEventCreate,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = EventService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventFilterParams),
    responses(
        (status = 200, description = "Paginated events", body = PaginatedEventsResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    _auth: RequireEventRead,
    Query(filters): Query<EventFilterParams>,
) -> Result<Json<PaginatedEventsResponse>, AppError> {
    let events = EventService::list(&state.db, filters).await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    _auth: RequireEventRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let event = EventService::get(&state.db, id).await?;
    Ok(Json(event))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "end_time must be after start_time"),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_event(
    State(state): State<AppState>,
    _auth: RequireEventUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<Event>, AppError> {
    let event = EventService::update(&state.db, id, dto).await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    _auth: RequireEventDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    EventService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
