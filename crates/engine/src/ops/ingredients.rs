//! Ingredient reference-data operations and the ad-hoc conversion entry
//! point.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{EngineError, Ingredient, Quantity, ResultEngine, ingredients};

use super::{Engine, normalize_optional_text, normalize_required_name};

impl Engine {
    /// Create an ingredient.
    ///
    /// `standard_unit` must exist in the catalog; `density` is grams per
    /// milliliter and must be > 0 when given.
    pub async fn new_ingredient(
        &self,
        name: &str,
        description: Option<&str>,
        standard_unit: Option<i64>,
        density: Option<Quantity>,
    ) -> ResultEngine<Ingredient> {
        let name = normalize_required_name(name, "ingredient")?;
        if let Some(unit_id) = standard_unit {
            self.catalog.unit(unit_id)?;
        }
        if let Some(density) = density
            && !density.is_positive()
        {
            return Err(EngineError::InvalidQuantity(
                "density must be > 0".to_string(),
            ));
        }

        let existing = ingredients::Entity::find()
            .filter(ingredients::Column::Name.eq(name.clone()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(name));
        }

        let model = ingredients::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(normalize_optional_text(description)),
            standard_unit: ActiveValue::Set(standard_unit),
            density_micro: ActiveValue::Set(density.map(Quantity::micro)),
        }
        .insert(&self.database)
        .await?;

        model.try_into()
    }

    /// Return an [`Ingredient`].
    pub async fn ingredient(&self, ingredient_id: i64) -> ResultEngine<Ingredient> {
        self.require_ingredient(ingredient_id).await
    }

    /// All ingredients, ordered by name.
    pub async fn list_ingredients(&self) -> ResultEngine<Vec<Ingredient>> {
        let models = ingredients::Entity::find()
            .order_by_asc(ingredients::Column::Name)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(model.try_into()?);
        }
        Ok(out)
    }

    /// Set or replace an ingredient density (grams per milliliter).
    pub async fn set_ingredient_density(
        &self,
        ingredient_id: i64,
        density: Quantity,
    ) -> ResultEngine<Ingredient> {
        if !density.is_positive() {
            return Err(EngineError::InvalidQuantity(
                "density must be > 0".to_string(),
            ));
        }
        self.require_ingredient(ingredient_id).await?;

        let model = ingredients::ActiveModel {
            id: ActiveValue::Set(ingredient_id),
            density_micro: ActiveValue::Set(Some(density.micro())),
            ..Default::default()
        }
        .update(&self.database)
        .await?;

        model.try_into()
    }

    /// Convert `quantity` between two catalog units.
    ///
    /// Mass↔volume requests need `ingredient_id` so the ingredient density
    /// can bridge the dimensions.
    pub async fn convert_quantity(
        &self,
        quantity: Quantity,
        from_unit: i64,
        to_unit: i64,
        ingredient_id: Option<i64>,
    ) -> ResultEngine<Quantity> {
        let ingredient = match ingredient_id {
            Some(id) => Some(self.require_ingredient(id).await?),
            None => None,
        };
        self.catalog
            .convert(quantity, from_unit, to_unit, ingredient.as_ref())
    }

    pub(super) async fn require_ingredient(&self, ingredient_id: i64) -> ResultEngine<Ingredient> {
        ingredients::Entity::find_by_id(ingredient_id)
            .one(&self.database)
            .await?
            .ok_or(EngineError::IngredientNotFound { ingredient_id })?
            .try_into()
    }
}
