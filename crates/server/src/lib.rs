use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod convert;
mod ingredients;
mod pantry;
mod recipes;
mod server;
mod shopping_list;
mod units;
mod user;

pub mod types {
    pub mod unit {
        pub use api_types::unit::{UnitView, UnitsResponse};
    }

    pub mod ingredient {
        pub use api_types::ingredient::{DensityUpdate, IngredientNew, IngredientView};
    }

    pub mod recipe {
        pub use api_types::recipe::{
            RecipeDetailResponse, RecipeLineNew, RecipeLineView, RecipeNew, RecipeView,
            RecipesResponse,
        };
    }

    pub mod pantry {
        pub use api_types::pantry::{
            PantryDelta, PantryEntryView, PantryRemoveResponse, PantryResponse,
        };
    }

    pub mod shopping {
        pub use api_types::shopping::{
            AggregatedLineView, GroupFailureView, ShoppingListRequest, ShoppingListResponse,
        };
    }

    pub mod convert {
        pub use api_types::convert::{ConvertRequest, ConvertResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_)
        | EngineError::UnitNotFound { .. }
        | EngineError::IngredientNotFound { .. }
        | EngineError::PantryNotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::MissingDensity { .. }
        | EngineError::IncompatibleUnits { .. }
        | EngineError::UnitMismatch { .. }
        | EngineError::InvalidQuantity(_)
        | EngineError::EmptySelection
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
