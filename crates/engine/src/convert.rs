//! Unit conversion arithmetic.
//!
//! All conversions are computed in `i128` from exact rational ratios and
//! rounded exactly once, at the end of the whole expression. Chaining
//! through the dimension base unit therefore never accumulates rounding
//! error: `convert(convert(q, a, b), b, a)` is `q` up to one micro-unit.

use crate::{
    Dimension, EngineError, Ingredient, Quantity, ResultEngine, Unit, UnitCatalog,
    quantity::MICRO,
};

/// Round `numer / denom` to the nearest integer, half away from zero.
fn div_round(numer: i128, denom: i128) -> i128 {
    let half = denom / 2;
    if numer >= 0 {
        (numer + half) / denom
    } else {
        (numer - half) / denom
    }
}

fn too_large() -> EngineError {
    EngineError::InvalidQuantity("quantity too large to convert".to_string())
}

/// Multiply a chain of factors with overflow checking.
fn checked_product(factors: &[i128]) -> ResultEngine<i128> {
    let mut product: i128 = 1;
    for factor in factors {
        product = product.checked_mul(*factor).ok_or_else(too_large)?;
    }
    Ok(product)
}

fn usable_density(ingredient: Option<&Ingredient>) -> Option<Quantity> {
    ingredient
        .and_then(|ingredient| ingredient.density)
        .filter(|density| density.is_positive())
}

impl UnitCatalog {
    /// Converts `quantity` from `from_id` to `to_id`.
    ///
    /// - same unit: returned unchanged, no arithmetic;
    /// - same dimension: exact ratio conversion;
    /// - mass↔volume: bridged through the ingredient density (grams per
    ///   milliliter), failing with [`EngineError::MissingDensity`] when the
    ///   ingredient has none;
    /// - count units never interconvert, not even with each other.
    pub fn convert(
        &self,
        quantity: Quantity,
        from_id: i64,
        to_id: i64,
        ingredient: Option<&Ingredient>,
    ) -> ResultEngine<Quantity> {
        let from = self.unit(from_id)?;
        let to = self.unit(to_id)?;

        if from.id == to.id {
            return Ok(quantity);
        }

        match (from.dimension, to.dimension) {
            (Dimension::Mass, Dimension::Mass) | (Dimension::Volume, Dimension::Volume) => {
                convert_same_dimension(quantity, from, to)
            }
            (Dimension::Volume, Dimension::Mass) => {
                let density = require_density(ingredient, from, to)?;
                // base_ml * density = base_g, all under a single rounding.
                let numer = checked_product(&[
                    quantity.micro() as i128,
                    from.ratio.numer as i128,
                    density.micro() as i128,
                    to.ratio.denom as i128,
                ])?;
                let denom = checked_product(&[
                    from.ratio.denom as i128,
                    MICRO as i128,
                    to.ratio.numer as i128,
                ])?;
                finish(numer, denom)
            }
            (Dimension::Mass, Dimension::Volume) => {
                let density = require_density(ingredient, from, to)?;
                let numer = checked_product(&[
                    quantity.micro() as i128,
                    from.ratio.numer as i128,
                    MICRO as i128,
                    to.ratio.denom as i128,
                ])?;
                let denom = checked_product(&[
                    from.ratio.denom as i128,
                    density.micro() as i128,
                    to.ratio.numer as i128,
                ])?;
                finish(numer, denom)
            }
            // Count is closed: a count unit converts to itself and nothing
            // else, and mass/volume never become counts.
            _ => Err(EngineError::IncompatibleUnits {
                from: from.name.clone(),
                to: to.name.clone(),
            }),
        }
    }
}

fn convert_same_dimension(quantity: Quantity, from: &Unit, to: &Unit) -> ResultEngine<Quantity> {
    let numer = checked_product(&[
        quantity.micro() as i128,
        from.ratio.numer as i128,
        to.ratio.denom as i128,
    ])?;
    let denom = checked_product(&[from.ratio.denom as i128, to.ratio.numer as i128])?;
    finish(numer, denom)
}

fn require_density(
    ingredient: Option<&Ingredient>,
    from: &Unit,
    to: &Unit,
) -> ResultEngine<Quantity> {
    match ingredient {
        Some(ingredient) => {
            usable_density(Some(ingredient)).ok_or(EngineError::MissingDensity {
                ingredient_id: ingredient.id,
            })
        }
        None => Err(EngineError::InvalidQuantity(format!(
            "an ingredient is required to convert between {} and {}",
            from.name, to.name
        ))),
    }
}

fn finish(numer: i128, denom: i128) -> ResultEngine<Quantity> {
    let rounded = div_round(numer, denom);
    let micro = i64::try_from(rounded).map_err(|_| too_large())?;
    Ok(Quantity::from_micro(micro))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitCatalog;

    fn catalog() -> UnitCatalog {
        UnitCatalog::builtin()
    }

    fn ingredient_with_density(density: &str) -> Ingredient {
        Ingredient {
            id: 42,
            name: "olive oil".to_string(),
            description: None,
            standard_unit: None,
            density: Some(density.parse().unwrap()),
        }
    }

    fn id(catalog: &UnitCatalog, name: &str) -> i64 {
        catalog.unit_by_name(name).unwrap().id
    }

    #[test]
    fn same_unit_is_identity() {
        let catalog = catalog();
        let g = id(&catalog, "g");
        let q = Quantity::from_micro(123_456);
        assert_eq!(catalog.convert(q, g, g, None).unwrap(), q);
    }

    #[test]
    fn mass_conversions_are_exact() {
        let catalog = catalog();
        let (g, kg, oz, lb) = (
            id(&catalog, "g"),
            id(&catalog, "kg"),
            id(&catalog, "oz"),
            id(&catalog, "lb"),
        );

        let two_and_half_kg: Quantity = "2.5".parse().unwrap();
        assert_eq!(
            catalog.convert(two_and_half_kg, kg, g, None).unwrap(),
            Quantity::from_whole(2_500)
        );

        let one_lb = Quantity::from_whole(1);
        assert_eq!(
            catalog.convert(one_lb, lb, oz, None).unwrap(),
            Quantity::from_whole(16)
        );
        assert_eq!(
            catalog.convert(one_lb, lb, g, None).unwrap(),
            "453.59237".parse().unwrap()
        );
    }

    #[test]
    fn us_volume_conversions_are_exact() {
        let catalog = catalog();
        let (cup, tsp, tbsp) = (
            id(&catalog, "cup"),
            id(&catalog, "tsp"),
            id(&catalog, "tbsp"),
        );

        let one_cup = Quantity::from_whole(1);
        assert_eq!(
            catalog.convert(one_cup, cup, tsp, None).unwrap(),
            Quantity::from_whole(48)
        );
        assert_eq!(
            catalog.convert(one_cup, cup, tbsp, None).unwrap(),
            Quantity::from_whole(16)
        );
    }

    #[test]
    fn inverse_law_holds_within_tolerance() {
        let catalog = catalog();
        let tolerance = Quantity::from_micro(2);
        let pairs = [
            ("g", "oz"),
            ("g", "lb"),
            ("kg", "mg"),
            ("ml", "tsp"),
            ("cup", "l"),
            ("quart", "tbsp"),
            ("pint", "fl oz"),
        ];
        let quantities = ["0", "1", "0.33", "17.25", "1234.567891"];

        for (a, b) in pairs {
            let (a, b) = (id(&catalog, a), id(&catalog, b));
            for q in quantities {
                let q: Quantity = q.parse().unwrap();
                let there = catalog.convert(q, a, b, None).unwrap();
                let back = catalog.convert(there, b, a, None).unwrap();
                assert!(
                    back.abs_diff(q) <= tolerance,
                    "round trip {q} via {a}->{b} gave {back}"
                );
            }
        }
    }

    #[test]
    fn density_bridges_mass_and_volume() {
        let catalog = catalog();
        let (g, ml) = (id(&catalog, "g"), id(&catalog, "ml"));
        // 0.5 g/ml: 1 g of it fills 2 ml, 1 ml of it weighs 0.5 g.
        let oil = ingredient_with_density("0.5");

        let one = Quantity::from_whole(1);
        assert_eq!(
            catalog.convert(one, g, ml, Some(&oil)).unwrap(),
            Quantity::from_whole(2)
        );
        assert_eq!(
            catalog.convert(one, ml, g, Some(&oil)).unwrap(),
            "0.5".parse().unwrap()
        );
    }

    #[test]
    fn density_round_trip_through_us_units() {
        let catalog = catalog();
        let (oz, tbsp) = (id(&catalog, "oz"), id(&catalog, "tbsp"));
        let oil = ingredient_with_density("0.91");
        let tolerance = Quantity::from_micro(2);

        let q: Quantity = "3.5".parse().unwrap();
        let there = catalog.convert(q, oz, tbsp, Some(&oil)).unwrap();
        let back = catalog.convert(there, tbsp, oz, Some(&oil)).unwrap();
        assert!(back.abs_diff(q) <= tolerance, "got {back}");
    }

    #[test]
    fn missing_density_is_reported_with_ingredient() {
        let catalog = catalog();
        let (g, ml) = (id(&catalog, "g"), id(&catalog, "ml"));
        let mut flour = ingredient_with_density("1");
        flour.density = None;

        let err = catalog
            .convert(Quantity::from_whole(1), g, ml, Some(&flour))
            .unwrap_err();
        assert_eq!(err, EngineError::MissingDensity { ingredient_id: 42 });
    }

    #[test]
    fn cross_dimension_without_ingredient_fails() {
        let catalog = catalog();
        let (g, ml) = (id(&catalog, "g"), id(&catalog, "ml"));
        assert!(matches!(
            catalog.convert(Quantity::from_whole(1), g, ml, None),
            Err(EngineError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn count_units_never_interconvert() {
        let catalog = catalog();
        let (piece, slice, g) = (
            id(&catalog, "piece"),
            id(&catalog, "slice"),
            id(&catalog, "g"),
        );
        let one = Quantity::from_whole(1);
        let oil = ingredient_with_density("0.9");

        // identity is still fine
        assert_eq!(catalog.convert(one, piece, piece, None).unwrap(), one);

        for (from, to) in [(piece, slice), (piece, g), (g, slice)] {
            let err = catalog.convert(one, from, to, Some(&oil)).unwrap_err();
            assert!(
                matches!(err, EngineError::IncompatibleUnits { .. }),
                "{from}->{to} gave {err}"
            );
        }
    }

    #[test]
    fn unknown_unit_fails() {
        let catalog = catalog();
        let g = id(&catalog, "g");
        assert_eq!(
            catalog
                .convert(Quantity::from_whole(1), g, 999, None)
                .unwrap_err(),
            EngineError::UnitNotFound { unit_id: 999 }
        );
    }
}
