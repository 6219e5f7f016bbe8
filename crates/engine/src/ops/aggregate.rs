//! The aggregation operation: fetch, order, and hand over to the pure core.

use std::collections::HashMap;

use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, Ingredient, RecipeIngredientLine, ResultEngine,
    aggregate::{AggregationReport, aggregate_lines},
    ingredients, recipe_ingredients, recipes,
};

use super::Engine;

impl Engine {
    /// Aggregate the ingredient needs of several recipes into per-ingredient
    /// totals (the shopping-list view).
    ///
    /// Read-only: the result is derived from the data-store state at call
    /// time. Lines for all recipes are fetched in a single query, and the
    /// input order of `recipe_ids` fixes the stable order used for
    /// target-unit selection, so equal selections give equal totals.
    pub async fn aggregate(
        &self,
        user_id: &str,
        recipe_ids: &[i64],
    ) -> ResultEngine<AggregationReport> {
        if recipe_ids.is_empty() {
            return Err(EngineError::EmptySelection);
        }
        let mut selection: Vec<i64> = Vec::with_capacity(recipe_ids.len());
        for &recipe_id in recipe_ids {
            if recipe_id <= 0 {
                return Err(EngineError::InvalidId(format!(
                    "recipe id must be a positive integer, got {recipe_id}"
                )));
            }
            if !selection.contains(&recipe_id) {
                selection.push(recipe_id);
            }
        }

        // All selected recipes must exist and belong to the caller.
        let found = recipes::Entity::find()
            .filter(recipes::Column::Id.is_in(selection.clone()))
            .filter(recipes::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;
        if found.len() != selection.len() {
            let missing = selection
                .iter()
                .find(|id| !found.iter().any(|model| model.id == **id))
                .copied()
                .unwrap_or_default();
            return Err(EngineError::KeyNotFound(format!(
                "recipe {missing} not exists"
            )));
        }

        // Single round trip for every line of every selected recipe.
        let line_models = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(selection.clone()))
            .order_by_asc(recipe_ingredients::Column::Id)
            .all(&self.database)
            .await?;

        let mut lines: Vec<RecipeIngredientLine> =
            line_models.into_iter().map(Into::into).collect();

        // Stable input order: position of the recipe in the selection, then
        // line id within the recipe.
        let position: HashMap<i64, usize> = selection
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        lines.sort_by_key(|line| (position.get(&line.recipe_id).copied(), line.id));

        // One query for the ingredients the lines reference.
        let mut ingredient_ids: Vec<i64> = lines.iter().map(|line| line.ingredient_id).collect();
        ingredient_ids.sort_unstable();
        ingredient_ids.dedup();

        let ingredient_models = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(ingredient_ids))
            .all(&self.database)
            .await?;

        let mut ingredient_map: HashMap<i64, Ingredient> =
            HashMap::with_capacity(ingredient_models.len());
        for model in ingredient_models {
            let ingredient: Ingredient = model.try_into()?;
            ingredient_map.insert(ingredient.id, ingredient);
        }

        Ok(aggregate_lines(&self.catalog, &lines, &ingredient_map))
    }
}
