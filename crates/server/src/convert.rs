//! Ad-hoc unit conversion API endpoint

use api_types::convert::{ConvertRequest, ConvertResponse};
use axum::{Extension, Json, extract::State};
use engine::Quantity;

use crate::{ServerError, server::ServerState, user};

pub async fn convert(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ServerError> {
    let converted = state
        .engine
        .convert_quantity(
            Quantity::from_micro(payload.quantity_micro),
            payload.from_unit_id,
            payload.to_unit_id,
            payload.ingredient_id,
        )
        .await?;

    Ok(Json(ConvertResponse {
        quantity_micro: converted.micro(),
    }))
}
