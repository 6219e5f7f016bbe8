//! Unit catalog API endpoints

use api_types::unit::{UnitView, UnitsResponse};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

fn map_dimension(dimension: engine::Dimension) -> api_types::Dimension {
    match dimension {
        engine::Dimension::Mass => api_types::Dimension::Mass,
        engine::Dimension::Volume => api_types::Dimension::Volume,
        engine::Dimension::Count => api_types::Dimension::Count,
    }
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<UnitsResponse>, ServerError> {
    let units = state
        .engine
        .catalog()
        .units()
        .into_iter()
        .map(|unit| UnitView {
            id: unit.id,
            name: unit.name.clone(),
            dimension: map_dimension(unit.dimension),
        })
        .collect();

    Ok(Json(UnitsResponse { units }))
}
