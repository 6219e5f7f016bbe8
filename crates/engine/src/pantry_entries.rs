//! Pantry entries: what a user owns of an ingredient.
//!
//! Keyed by (user, ingredient). A row existing means the user owns a
//! quantity > 0 of the ingredient, expressed in the row's unit; absence
//! means zero. The engine deletes the row the moment an update would bring
//! it to zero or below, so a stored non-positive quantity never exists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// A user's owned quantity of one ingredient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PantryEntry {
    pub user_id: String,
    pub ingredient_id: i64,
    /// Always > 0, expressed in `unit_id`.
    pub quantity: Quantity,
    pub unit_id: i64,
}

/// Outcome of a pantry removal: the key either still holds a quantity or
/// the row was deleted (result would have been ≤ 0).
#[derive(Clone, Debug, PartialEq)]
pub enum RemoveOutcome {
    Remaining(PantryEntry),
    Deleted,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pantry_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ingredient_id: i64,
    pub quantity_micro: i64,
    pub unit_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::ingredients::Entity",
        from = "Column::IngredientId",
        to = "super::ingredients::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Ingredients,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PantryEntry {
    fn from(model: Model) -> Self {
        PantryEntry {
            user_id: model.user_id,
            ingredient_id: model.ingredient_id,
            quantity: Quantity::from_micro(model.quantity_micro),
            unit_id: model.unit_id,
        }
    }
}
