//! Recipe ingredient lines.
//!
//! One row per (recipe, ingredient) pair: "this recipe needs `quantity`
//! `unit` of this ingredient". Quantity and unit are both optional in the
//! data model (imported recipes are often incomplete); aggregation reports
//! the holes instead of guessing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// An ingredient line of a recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredientLine {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: Option<Quantity>,
    pub unit_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recipe_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity_micro: Option<i64>,
    pub unit_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recipes::Entity",
        from = "Column::RecipeId",
        to = "super::recipes::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recipes,
    #[sea_orm(
        belongs_to = "super::ingredients::Entity",
        from = "Column::IngredientId",
        to = "super::ingredients::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Ingredients,
}

impl Related<super::recipes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl Related<super::ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RecipeIngredientLine {
    fn from(model: Model) -> Self {
        RecipeIngredientLine {
            id: model.id,
            recipe_id: model.recipe_id,
            ingredient_id: model.ingredient_id,
            quantity: model.quantity_micro.map(Quantity::from_micro),
            unit_id: model.unit_id,
        }
    }
}
