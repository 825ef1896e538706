use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::rooms::{
    AvailabilityQuery, CreateRoomDto, PaginatedRoomsResponse, Room, RoomAvailabilityResponse,
    RoomFilterParams, UpdateRoomDto,
};

use crate::middleware::auth::{
    RequireRoomCreate, RequireRoomDelete, RequireRoomRead, RequireRoomUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::RoomService;

#[utoipa::path(
    post,
    path = "/api/rooms",
    request_body = CreateRoomDto,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 409, description = "Room number already in use"),
        (status = 422, description = "Validation error")
    ),
    tag = "Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_room(
    State(state): State<AppState>,
    _auth: RequireRoomCreate,
    ValidatedJson(dto): ValidatedJson<CreateRoomDto>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let room = RoomService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

#[utoipa::path(
    get,
    path = "/api/rooms",
    params(RoomFilterParams),
    responses(
        (status = 200, description = "Paginated rooms", body = PaginatedRoomsResponse)
    ),
    tag = "Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_rooms(
    State(state): State<AppState>,
    _auth: RequireRoomRead,
    Query(filters): Query<RoomFilterParams>,
) -> Result<Json<PaginatedRoomsResponse>, AppError> {
    let rooms = RoomService::list(&state.db, filters).await?;
    Ok(Json(rooms))
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room", body = Room),
        (status = 404, description = "Room not found")
    ),
    tag = "Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    _auth: RequireRoomRead,
    Path(id): Path<Uuid>,
) -> Result<Json<Room>, AppError> {
    let room = RoomService::get(&state.db, id).await?;
    Ok(Json(room))
}

#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomDto,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room number already in use")
    ),
    tag = "Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_room(
    State(state): State<AppState>,
    _auth: RequireRoomUpdate,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateRoomDto>,
) -> Result<Json<Room>, AppError> {
    let room = RoomService::update(&state.db, id, dto).await?;
    Ok(Json(room))
}

#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 404, description = "Room not found")
    ),
    tag = "Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_room(
    State(state): State<AppState>,
    _auth: RequireRoomDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    RoomService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}/availability",
    params(("id" = Uuid, Path, description = "Room ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Availability over the span", body = RoomAvailabilityResponse),
        (status = 400, description = "Missing or inverted span"),
        (status = 404, description = "Room not found")
    ),
    tag = "Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_room_availability(
    State(state): State<AppState>,
    _auth: RequireRoomRead,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<RoomAvailabilityResponse>, AppError> {
    let availability = RoomService::availability(&state.db, id, query).await?;
    Ok(Json(availability))
}
