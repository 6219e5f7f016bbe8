use sea_orm::{DatabaseConnection, EntityTrait};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine, UnitCatalog, units};

mod aggregate;
mod ingredients;
mod pantry;
mod recipes;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The service core: unit catalog, converter, aggregation and pantry
/// accounting over one database connection.
///
/// The engine is request scoped and stateless between calls; the only
/// engine-held state is the immutable [`UnitCatalog`] loaded at build time.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    catalog: UnitCatalog,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The unit catalog this engine converts with.
    #[must_use]
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidId(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.nfc().collect())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`.
    ///
    /// Loads the unit catalog from the database; on a fresh database the
    /// builtin catalog is seeded first. Units are reference data and are
    /// never reloaded after this point.
    pub async fn build(self) -> ResultEngine<Engine> {
        let unit_models: Vec<units::Model> = units::Entity::find().all(&self.database).await?;

        let catalog = if unit_models.is_empty() {
            let builtin = units::builtin_units();
            tracing::info!("seeding {} builtin units", builtin.len());
            units::Entity::insert_many(builtin.iter().map(units::ActiveModel::from))
                .exec(&self.database)
                .await?;
            UnitCatalog::from_units(builtin)
        } else {
            let mut loaded = Vec::with_capacity(unit_models.len());
            for model in unit_models {
                loaded.push(model.try_into()?);
            }
            UnitCatalog::from_units(loaded)
        };

        Ok(Engine {
            database: self.database,
            catalog,
        })
    }
}
