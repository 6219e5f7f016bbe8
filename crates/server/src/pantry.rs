//! Pantry API endpoints

use api_types::pantry::{PantryDelta, PantryEntryView, PantryRemoveResponse, PantryResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{EngineError, Quantity, RemoveOutcome};

use crate::{ServerError, server::ServerState, user};

fn map_entry(entry: engine::PantryEntry) -> PantryEntryView {
    PantryEntryView {
        ingredient_id: entry.ingredient_id,
        quantity_micro: entry.quantity.micro(),
        unit_id: entry.unit_id,
    }
}

pub async fn add(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PantryDelta>,
) -> Result<Json<PantryEntryView>, ServerError> {
    let entry = state
        .engine
        .add_to_pantry(
            &user.username,
            payload.ingredient_id,
            Quantity::from_micro(payload.quantity_micro),
            payload.unit_id,
        )
        .await?;

    Ok(Json(map_entry(entry)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PantryDelta>,
) -> Result<Json<PantryRemoveResponse>, ServerError> {
    let outcome = state
        .engine
        .remove_from_pantry(
            &user.username,
            payload.ingredient_id,
            Quantity::from_micro(payload.quantity_micro),
            payload.unit_id,
        )
        .await?;

    let response = match outcome {
        RemoveOutcome::Remaining(entry) => PantryRemoveResponse {
            deleted: false,
            remaining: Some(map_entry(entry)),
        },
        RemoveOutcome::Deleted => PantryRemoveResponse {
            deleted: true,
            remaining: None,
        },
    };

    Ok(Json(response))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(ingredient_id): Path<i64>,
) -> Result<Json<PantryEntryView>, ServerError> {
    let entry = state
        .engine
        .pantry_entry(&user.username, ingredient_id)
        .await?
        .ok_or(EngineError::PantryNotFound { ingredient_id })?;

    Ok(Json(map_entry(entry)))
}

pub async fn clear(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(ingredient_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .clear_pantry_entry(&user.username, ingredient_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<PantryResponse>, ServerError> {
    let entries = state.engine.list_pantry(&user.username).await?;
    Ok(Json(PantryResponse {
        entries: entries.into_iter().map(map_entry).collect(),
    }))
}
