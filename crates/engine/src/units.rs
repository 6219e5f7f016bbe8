//! Measurement units and the immutable unit catalog.
//!
//! Units are reference data: seeded once, rarely modified. Each unit belongs
//! to a [`Dimension`] and carries an exact rational ratio to the dimension
//! base unit (gram for mass, milliliter for volume). Count units have ratio
//! 1/1 and never interconvert.

use std::collections::HashMap;

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Measurement dimension a unit belongs to.
///
/// Units within the same dimension convert by fixed ratio. Mass and volume
/// bridge through an ingredient density; `Count` never interconverts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

impl Dimension {
    /// Canonical dimension string used by the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Dimension::Mass => "mass",
            Dimension::Volume => "volume",
            Dimension::Count => "count",
        }
    }
}

impl TryFrom<&str> for Dimension {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "mass" => Ok(Dimension::Mass),
            "volume" => Ok(Dimension::Volume),
            "count" => Ok(Dimension::Count),
            other => Err(EngineError::InvalidId(format!(
                "unknown dimension: {other}"
            ))),
        }
    }
}

/// Exact ratio of a unit to its dimension base unit.
///
/// Stored as a reduced rational so that legally-defined constants (e.g.
/// 1 lb = 45359237/100000 g) stay exact instead of drifting through floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub numer: i64,
    pub denom: i64,
}

impl Ratio {
    pub const ONE: Ratio = Ratio { numer: 1, denom: 1 };

    #[must_use]
    pub const fn new(numer: i64, denom: i64) -> Self {
        Self { numer, denom }
    }
}

/// A measurement unit from the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub dimension: Dimension,
    /// Ratio to the dimension base unit (gram, milliliter). 1/1 for count.
    pub ratio: Ratio,
}

/// Immutable catalog of known units, keyed by id.
///
/// Built once (from the database, or from [`builtin_units`] in tests) and
/// injected wherever conversion happens; it is never mutated after build.
#[derive(Clone, Debug, Default)]
pub struct UnitCatalog {
    by_id: HashMap<i64, Unit>,
}

impl UnitCatalog {
    #[must_use]
    pub fn from_units(units: Vec<Unit>) -> Self {
        let by_id = units.into_iter().map(|unit| (unit.id, unit)).collect();
        Self { by_id }
    }

    /// The full builtin catalog, for tests and seeding.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_units(builtin_units())
    }

    pub fn unit(&self, unit_id: i64) -> ResultEngine<&Unit> {
        self.by_id
            .get(&unit_id)
            .ok_or(EngineError::UnitNotFound { unit_id })
    }

    /// Lookup by display name, mostly useful in tests and seeds.
    pub fn unit_by_name(&self, name: &str) -> ResultEngine<&Unit> {
        self.by_id
            .values()
            .find(|unit| unit.name == name)
            .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))
    }

    /// All units, ordered by id for stable listings.
    #[must_use]
    pub fn units(&self) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self.by_id.values().collect();
        units.sort_by_key(|unit| unit.id);
        units
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// The avoirdupois pound and the US gallon are defined by law as exact
// decimals (453.59237 g, 3.785411784 l); every ratio below derives from
// those two constants or from metric prefixes.
const LB_G: Ratio = Ratio::new(45_359_237, 100_000);
const OZ_G: Ratio = Ratio::new(45_359_237, 1_600_000);
const FLOZ_ML: Ratio = Ratio::new(473_176_473, 16_000_000);
const TSP_ML: Ratio = Ratio::new(157_725_491, 32_000_000);
const TBSP_ML: Ratio = Ratio::new(473_176_473, 32_000_000);
const CUP_ML: Ratio = Ratio::new(473_176_473, 2_000_000);
const PINT_ML: Ratio = Ratio::new(473_176_473, 1_000_000);
const QUART_ML: Ratio = Ratio::new(473_176_473, 500_000);

/// The seed unit list with stable ids.
///
/// Ids are part of the persisted data model; append new units at the end,
/// never renumber.
#[must_use]
pub fn builtin_units() -> Vec<Unit> {
    let unit = |id: i64, name: &str, dimension: Dimension, ratio: Ratio| Unit {
        id,
        name: name.to_string(),
        dimension,
        ratio,
    };

    vec![
        unit(1, "mg", Dimension::Mass, Ratio::new(1, 1_000)),
        unit(2, "g", Dimension::Mass, Ratio::ONE),
        unit(3, "kg", Dimension::Mass, Ratio::new(1_000, 1)),
        unit(4, "oz", Dimension::Mass, OZ_G),
        unit(5, "lb", Dimension::Mass, LB_G),
        unit(6, "ml", Dimension::Volume, Ratio::ONE),
        unit(7, "l", Dimension::Volume, Ratio::new(1_000, 1)),
        unit(8, "tsp", Dimension::Volume, TSP_ML),
        unit(9, "tbsp", Dimension::Volume, TBSP_ML),
        unit(10, "fl oz", Dimension::Volume, FLOZ_ML),
        unit(11, "cup", Dimension::Volume, CUP_ML),
        unit(12, "pint", Dimension::Volume, PINT_ML),
        unit(13, "quart", Dimension::Volume, QUART_ML),
        unit(14, "piece", Dimension::Count, Ratio::ONE),
        unit(15, "slice", Dimension::Count, Ratio::ONE),
        unit(16, "can", Dimension::Count, Ratio::ONE),
        unit(17, "unit", Dimension::Count, Ratio::ONE),
    ]
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub dimension: String,
    pub ratio_numer: i64,
    pub ratio_denom: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Unit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        if model.ratio_numer <= 0 || model.ratio_denom <= 0 {
            return Err(EngineError::InvalidId(format!(
                "unit {} has a non-positive ratio",
                model.id
            )));
        }
        Ok(Unit {
            id: model.id,
            name: model.name,
            dimension: Dimension::try_from(model.dimension.as_str())?,
            ratio: Ratio::new(model.ratio_numer, model.ratio_denom),
        })
    }
}

impl From<&Unit> for ActiveModel {
    fn from(unit: &Unit) -> Self {
        Self {
            id: ActiveValue::Set(unit.id),
            name: ActiveValue::Set(unit.name.clone()),
            dimension: ActiveValue::Set(unit.dimension.as_str().to_string()),
            ratio_numer: ActiveValue::Set(unit.ratio.numer),
            ratio_denom: ActiveValue::Set(unit.ratio.denom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let units = builtin_units();
        let mut ids: Vec<i64> = units.iter().map(|u| u.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), units.len());
    }

    #[test]
    fn builtin_covers_required_units() {
        let catalog = UnitCatalog::builtin();
        for name in [
            "mg", "g", "kg", "oz", "lb", "ml", "l", "tsp", "tbsp", "cup", "quart", "pint",
            "fl oz", "piece", "slice", "can", "unit",
        ] {
            assert!(catalog.unit_by_name(name).is_ok(), "missing unit {name}");
        }
    }

    #[test]
    fn lookup_unknown_unit_fails() {
        let catalog = UnitCatalog::builtin();
        assert_eq!(
            catalog.unit(999).unwrap_err(),
            EngineError::UnitNotFound { unit_id: 999 }
        );
    }

    #[test]
    fn us_volume_units_are_floz_multiples() {
        // tsp = fl oz / 6, tbsp = fl oz / 2, cup = 8 fl oz, etc. Keeping the
        // ratios coherent keeps conversions between them exact.
        assert_eq!(TSP_ML.numer * 3, TBSP_ML.numer);
        assert_eq!(TBSP_ML.denom, TSP_ML.denom);
        assert_eq!(CUP_ML.numer, FLOZ_ML.numer);
        assert_eq!(FLOZ_ML.denom, CUP_ML.denom * 8);
        assert_eq!(PINT_ML.denom * 16, FLOZ_ML.denom);
        assert_eq!(QUART_ML.denom * 32, FLOZ_ML.denom);
    }
}
