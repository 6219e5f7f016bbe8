//! Recipe and recipe-line operations.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Quantity, Recipe, RecipeIngredientLine, ResultEngine, recipe_ingredients, recipes,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Create a recipe owned by `user_id`.
    pub async fn new_recipe(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Recipe> {
        let name = normalize_required_name(name, "recipe")?;

        let model = recipes::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(normalize_optional_text(description)),
            user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(created_at),
        }
        .insert(&self.database)
        .await?;

        Ok(model.into())
    }

    /// Return a user's recipe.
    pub async fn recipe(&self, user_id: &str, recipe_id: i64) -> ResultEngine<Recipe> {
        self.require_recipe(user_id, recipe_id).await.map(Into::into)
    }

    /// All recipes of a user, newest first.
    pub async fn list_recipes(&self, user_id: &str) -> ResultEngine<Vec<Recipe>> {
        let models = recipes::Entity::find()
            .filter(recipes::Column::UserId.eq(user_id))
            .order_by_desc(recipes::Column::CreatedAt)
            .all(&self.database)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Delete a recipe and its ingredient lines.
    pub async fn delete_recipe(&self, user_id: &str, recipe_id: i64) -> ResultEngine<()> {
        self.require_recipe(user_id, recipe_id).await?;

        with_tx!(self, |db_tx| {
            recipe_ingredients::Entity::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
                .exec(&db_tx)
                .await?;
            recipes::Entity::delete_by_id(recipe_id).exec(&db_tx).await?;
            Ok::<_, EngineError>(())
        })
    }

    /// Add an ingredient line to a recipe.
    ///
    /// A recipe holds at most one line per ingredient; quantity and unit are
    /// optional but a quantity, when given, must be > 0 and a unit must
    /// exist in the catalog.
    pub async fn add_recipe_line(
        &self,
        user_id: &str,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: Option<Quantity>,
        unit_id: Option<i64>,
    ) -> ResultEngine<RecipeIngredientLine> {
        self.require_recipe(user_id, recipe_id).await?;
        self.require_ingredient(ingredient_id).await?;
        if let Some(unit_id) = unit_id {
            self.catalog.unit(unit_id)?;
        }
        if let Some(quantity) = quantity
            && !quantity.is_positive()
        {
            return Err(EngineError::InvalidQuantity(
                "line quantity must be > 0".to_string(),
            ));
        }

        let existing = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .filter(recipe_ingredients::Column::IngredientId.eq(ingredient_id))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "recipe {recipe_id} already lists ingredient {ingredient_id}"
            )));
        }

        let model = recipe_ingredients::ActiveModel {
            id: ActiveValue::NotSet,
            recipe_id: ActiveValue::Set(recipe_id),
            ingredient_id: ActiveValue::Set(ingredient_id),
            quantity_micro: ActiveValue::Set(quantity.map(Quantity::micro)),
            unit_id: ActiveValue::Set(unit_id),
        }
        .insert(&self.database)
        .await?;

        Ok(model.into())
    }

    /// Remove an ingredient line from a recipe.
    pub async fn remove_recipe_line(
        &self,
        user_id: &str,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> ResultEngine<()> {
        self.require_recipe(user_id, recipe_id).await?;

        let deleted = recipe_ingredients::Entity::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .filter(recipe_ingredients::Column::IngredientId.eq(ingredient_id))
            .exec(&self.database)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!(
                "recipe {recipe_id} has no line for ingredient {ingredient_id}"
            )));
        }
        Ok(())
    }

    /// The ingredient lines of a recipe, in insertion order.
    pub async fn recipe_lines(
        &self,
        user_id: &str,
        recipe_id: i64,
    ) -> ResultEngine<Vec<RecipeIngredientLine>> {
        self.require_recipe(user_id, recipe_id).await?;

        let models = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredients::Column::Id)
            .all(&self.database)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    pub(super) async fn require_recipe(
        &self,
        user_id: &str,
        recipe_id: i64,
    ) -> ResultEngine<recipes::Model> {
        let model = recipes::Entity::find_by_id(recipe_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("recipe not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::KeyNotFound("recipe not exists".to_string()));
        }
        Ok(model)
    }
}
