//! The module contains the representation of an ingredient.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Quantity};

/// An ingredient.
///
/// Ingredients are shared reference data: recipes reference them by id and
/// pantry entries count them per user. The optional `standard_unit` is the
/// unit pantry quantities and aggregation totals are expressed in; the
/// optional `density` (grams per milliliter) licenses mass↔volume
/// conversion for this ingredient only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub standard_unit: Option<i64>,
    pub density: Option<Quantity>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub standard_unit: Option<i64>,
    pub density_micro: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    RecipeIngredients,
    #[sea_orm(has_many = "super::pantry_entries::Entity")]
    PantryEntries,
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl Related<super::pantry_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PantryEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Ingredient {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        if let Some(micro) = model.density_micro
            && micro <= 0
        {
            return Err(EngineError::InvalidQuantity(format!(
                "ingredient {} has a non-positive density",
                model.id
            )));
        }
        Ok(Ingredient {
            id: model.id,
            name: model.name,
            description: model.description,
            standard_unit: model.standard_unit,
            density: model.density_micro.map(Quantity::from_micro),
        })
    }
}
