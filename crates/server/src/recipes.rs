//! Recipe API endpoints

use api_types::recipe::{
    RecipeDetailResponse, RecipeLineNew, RecipeLineView, RecipeNew, RecipeView, RecipesResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::Quantity;

use crate::{ServerError, server::ServerState, user};

fn map_recipe(recipe: engine::Recipe) -> RecipeView {
    RecipeView {
        id: recipe.id,
        name: recipe.name,
        description: recipe.description,
    }
}

fn map_line(line: engine::RecipeIngredientLine) -> RecipeLineView {
    RecipeLineView {
        ingredient_id: line.ingredient_id,
        quantity_micro: line.quantity.map(Quantity::micro),
        unit_id: line.unit_id,
    }
}

pub async fn new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecipeNew>,
) -> Result<(StatusCode, Json<RecipeView>), ServerError> {
    let recipe = state
        .engine
        .new_recipe(
            &user.username,
            &payload.name,
            payload.description.as_deref(),
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_recipe(recipe))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<RecipesResponse>, ServerError> {
    let recipes = state.engine.list_recipes(&user.username).await?;
    Ok(Json(RecipesResponse {
        recipes: recipes.into_iter().map(map_recipe).collect(),
    }))
}

pub async fn get_detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<RecipeDetailResponse>, ServerError> {
    let recipe = state.engine.recipe(&user.username, recipe_id).await?;
    let lines = state.engine.recipe_lines(&user.username, recipe_id).await?;

    Ok(Json(RecipeDetailResponse {
        recipe: map_recipe(recipe),
        lines: lines.into_iter().map(map_line).collect(),
    }))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(recipe_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_recipe(&user.username, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_line(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(recipe_id): Path<i64>,
    Json(payload): Json<RecipeLineNew>,
) -> Result<(StatusCode, Json<RecipeLineView>), ServerError> {
    let line = state
        .engine
        .add_recipe_line(
            &user.username,
            recipe_id,
            payload.ingredient_id,
            payload.quantity_micro.map(Quantity::from_micro),
            payload.unit_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_line(line))))
}

pub async fn remove_line(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((recipe_id, ingredient_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_recipe_line(&user.username, recipe_id, ingredient_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
