//! Ingredient API endpoints

use api_types::ingredient::{DensityUpdate, IngredientNew, IngredientView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Quantity;

use crate::{ServerError, server::ServerState, user};

pub(crate) fn map_ingredient(ingredient: engine::Ingredient) -> IngredientView {
    IngredientView {
        id: ingredient.id,
        name: ingredient.name,
        description: ingredient.description,
        standard_unit_id: ingredient.standard_unit,
        density_micro: ingredient.density.map(Quantity::micro),
    }
}

pub async fn new(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<IngredientNew>,
) -> Result<(StatusCode, Json<IngredientView>), ServerError> {
    let ingredient = state
        .engine
        .new_ingredient(
            &payload.name,
            payload.description.as_deref(),
            payload.standard_unit_id,
            payload.density_micro.map(Quantity::from_micro),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_ingredient(ingredient))))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<IngredientView>>, ServerError> {
    let ingredients = state.engine.list_ingredients().await?;
    Ok(Json(ingredients.into_iter().map(map_ingredient).collect()))
}

pub async fn get(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(ingredient_id): Path<i64>,
) -> Result<Json<IngredientView>, ServerError> {
    let ingredient = state.engine.ingredient(ingredient_id).await?;
    Ok(Json(map_ingredient(ingredient)))
}

pub async fn set_density(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(ingredient_id): Path<i64>,
    Json(payload): Json<DensityUpdate>,
) -> Result<Json<IngredientView>, ServerError> {
    let ingredient = state
        .engine
        .set_ingredient_density(ingredient_id, Quantity::from_micro(payload.density_micro))
        .await?;
    Ok(Json(map_ingredient(ingredient)))
}
