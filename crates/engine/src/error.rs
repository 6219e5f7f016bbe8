//! The module contains the error the engine can throw.
//!
//! Conversion and aggregation errors carry the ids and unit names involved so
//! callers can build a precise user-facing message; the engine never
//! logs-and-swallows.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced unit id does not exist in the catalog.
    #[error("unit {unit_id} not found in the catalog")]
    UnitNotFound { unit_id: i64 },
    /// Referenced ingredient id is unknown.
    #[error("ingredient {ingredient_id} not found")]
    IngredientNotFound { ingredient_id: i64 },
    /// Mass↔volume conversion requested for an ingredient without a density.
    #[error("ingredient {ingredient_id} has no density for mass/volume conversion")]
    MissingDensity { ingredient_id: i64 },
    /// Conversion between dimensions that never interconvert (count vs
    /// anything, distinct count units).
    #[error("cannot convert between {from} and {to}")]
    IncompatibleUnits { from: String, to: String },
    /// A recipe line could not be converted into its group target unit.
    #[error(
        "recipe {recipe_id}: ingredient {ingredient_id} in {line_unit} cannot \
         be aggregated into {target_unit}"
    )]
    UnitMismatch {
        recipe_id: i64,
        ingredient_id: i64,
        line_unit: String,
        target_unit: String,
    },
    /// Non-positive or malformed quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
    /// Pantry operation against an absent (user, ingredient) key.
    #[error("no pantry entry for ingredient {ingredient_id}")]
    PantryNotFound { ingredient_id: i64 },
    /// Aggregation requested with no recipe ids.
    #[error("recipe selection is empty")]
    EmptySelection,
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    /// An atomic pantry update lost a race; the caller may retry.
    #[error("concurrent update conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UnitNotFound { unit_id: a }, Self::UnitNotFound { unit_id: b }) => a == b,
            (
                Self::IngredientNotFound { ingredient_id: a },
                Self::IngredientNotFound { ingredient_id: b },
            ) => a == b,
            (
                Self::MissingDensity { ingredient_id: a },
                Self::MissingDensity { ingredient_id: b },
            ) => a == b,
            (
                Self::IncompatibleUnits { from: af, to: at },
                Self::IncompatibleUnits { from: bf, to: bt },
            ) => af == bf && at == bt,
            (
                Self::UnitMismatch {
                    recipe_id: ar,
                    ingredient_id: ai,
                    line_unit: al,
                    target_unit: at,
                },
                Self::UnitMismatch {
                    recipe_id: br,
                    ingredient_id: bi,
                    line_unit: bl,
                    target_unit: bt,
                },
            ) => ar == br && ai == bi && al == bl && at == bt,
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (
                Self::PantryNotFound { ingredient_id: a },
                Self::PantryNotFound { ingredient_id: b },
            ) => a == b,
            (Self::EmptySelection, Self::EmptySelection) => true,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
