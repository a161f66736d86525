//! Room Handlers
//!
//! - `GET /history/{room}` - Stored messages of a room, oldest first
//! - `POST /create-room/{room}` - Start a room over with empty history

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::Message;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RoomPath {
    #[validate(length(min = 1, max = 128))]
    pub room: String,
}

#[derive(Debug, Serialize)]
pub struct RoomCreatedResponse {
    pub message: String,
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(path): Path<RoomPath>,
) -> Result<Json<Vec<Message>>, AppError> {
    path.validate().map_err(validation_error)?;
    let messages = state.rooms.history(&path.room).await?;
    Ok(Json(messages))
}

pub async fn create_room(
    State(state): State<AppState>,
    Path(path): Path<RoomPath>,
) -> Result<(StatusCode, Json<RoomCreatedResponse>), AppError> {
    path.validate().map_err(validation_error)?;
    state.rooms.reset(&path.room).await?;

    Ok((
        StatusCode::CREATED,
        Json(RoomCreatedResponse {
            message: format!("Room '{}' created/reset.", path.room),
        }),
    ))
}
