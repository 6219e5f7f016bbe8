//! The unit-conversion and ingredient-aggregation engine.
//!
//! The engine owns the numeric semantics of the application: the closed
//! unit catalog, conversion arithmetic (including mass↔volume bridging via
//! ingredient density), multi-recipe aggregation, and the per-user pantry
//! accounting. Storage is a sea-orm connection handed in at build time; the
//! HTTP layer lives in the `server` crate.

pub use aggregate::{AggregatedLine, AggregationReport, GroupFailure};
pub use error::EngineError;
pub use ingredients::Ingredient;
pub use ops::{Engine, EngineBuilder};
pub use pantry_entries::{PantryEntry, RemoveOutcome};
pub use quantity::{MICRO, Quantity};
pub use recipe_ingredients::RecipeIngredientLine;
pub use recipes::Recipe;
pub use units::{Dimension, Ratio, Unit, UnitCatalog, builtin_units};

mod aggregate;
mod convert;
mod error;
mod ingredients;
mod ops;
mod pantry_entries;
mod quantity;
mod recipe_ingredients;
mod recipes;
mod units;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
