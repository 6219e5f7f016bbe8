//! Request/response types shared between the server and its clients.
//!
//! Quantities travel as integer micro-units (`*_micro`, millionths of a
//! unit); the engine is the only place that does arithmetic on them.

use serde::{Deserialize, Serialize};

/// Measurement dimension of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

pub mod unit {
    use super::*;

    /// A catalog unit as exposed by `GET /units`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnitView {
        pub id: i64,
        pub name: String,
        pub dimension: Dimension,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnitsResponse {
        pub units: Vec<UnitView>,
    }
}

pub mod ingredient {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientNew {
        pub name: String,
        pub description: Option<String>,
        pub standard_unit_id: Option<i64>,
        /// Grams per milliliter, in micro-units.
        pub density_micro: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientView {
        pub id: i64,
        pub name: String,
        pub description: Option<String>,
        pub standard_unit_id: Option<i64>,
        pub density_micro: Option<i64>,
    }

    /// Body of `PATCH /ingredients/{id}/density`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DensityUpdate {
        pub density_micro: i64,
    }
}

pub mod recipe {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeView {
        pub id: i64,
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeLineNew {
        pub ingredient_id: i64,
        pub quantity_micro: Option<i64>,
        pub unit_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeLineView {
        pub ingredient_id: i64,
        pub quantity_micro: Option<i64>,
        pub unit_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeDetailResponse {
        pub recipe: RecipeView,
        pub lines: Vec<RecipeLineView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipesResponse {
        pub recipes: Vec<RecipeView>,
    }
}

pub mod pantry {
    use super::*;

    /// Body of `POST /pantry/add` and `POST /pantry/remove`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PantryDelta {
        pub ingredient_id: i64,
        pub quantity_micro: i64,
        pub unit_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PantryEntryView {
        pub ingredient_id: i64,
        pub quantity_micro: i64,
        pub unit_id: i64,
    }

    /// Outcome of a removal: either the remaining entry, or deletion.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PantryRemoveResponse {
        pub deleted: bool,
        pub remaining: Option<PantryEntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PantryResponse {
        pub entries: Vec<PantryEntryView>,
    }
}

pub mod shopping {
    use super::*;

    /// Body of `POST /shoppingList`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShoppingListRequest {
        pub recipe_ids: Vec<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AggregatedLineView {
        pub ingredient_id: i64,
        pub ingredient_name: String,
        pub total_micro: i64,
        pub unit_id: i64,
        pub unit_name: String,
        pub recipe_ids: Vec<i64>,
    }

    /// An ingredient group that could not be summed.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupFailureView {
        pub ingredient_id: i64,
        pub ingredient_name: String,
        pub error: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShoppingListResponse {
        pub lines: Vec<AggregatedLineView>,
        pub failures: Vec<GroupFailureView>,
    }
}

pub mod convert {
    use super::*;

    /// Body of `POST /convert`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConvertRequest {
        pub quantity_micro: i64,
        pub from_unit_id: i64,
        pub to_unit_id: i64,
        /// Needed for mass↔volume conversions (density lookup).
        pub ingredient_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConvertResponse {
        pub quantity_micro: i64,
    }
}
