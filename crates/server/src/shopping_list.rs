//! Shopping list (aggregation) API endpoint

use api_types::shopping::{
    AggregatedLineView, GroupFailureView, ShoppingListRequest, ShoppingListResponse,
};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

pub async fn aggregate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ShoppingListRequest>,
) -> Result<Json<ShoppingListResponse>, ServerError> {
    let report = state
        .engine
        .aggregate(&user.username, &payload.recipe_ids)
        .await?;

    let lines = report
        .lines
        .into_iter()
        .map(|line| AggregatedLineView {
            ingredient_id: line.ingredient_id,
            ingredient_name: line.ingredient_name,
            total_micro: line.total.micro(),
            unit_id: line.unit_id,
            unit_name: line.unit_name,
            recipe_ids: line.recipe_ids,
        })
        .collect();

    let failures = report
        .failures
        .into_iter()
        .map(|failure| GroupFailureView {
            ingredient_id: failure.ingredient_id,
            ingredient_name: failure.ingredient_name,
            error: failure.error.to_string(),
        })
        .collect();

    Ok(Json(ShoppingListResponse { lines, failures }))
}
