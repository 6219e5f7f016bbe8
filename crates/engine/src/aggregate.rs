//! Multi-recipe ingredient aggregation.
//!
//! The core is a pure function over already-fetched records: it groups
//! recipe lines by ingredient, picks a target unit per group, converts every
//! line into it and sums. Groups are fault isolated: a line that cannot be
//! converted fails its own ingredient group and leaves the others alone,
//! and the failure is reported next to the successes instead of producing a
//! silently partial total.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    EngineError, Ingredient, Quantity, RecipeIngredientLine, UnitCatalog,
};

/// Per-ingredient total across the selected recipes. Not persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedLine {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub total: Quantity,
    pub unit_id: i64,
    pub unit_name: String,
    /// Recipes that contributed, in input order ("from: X, Y").
    pub recipe_ids: Vec<i64>,
}

/// An ingredient group that could not be summed, with the blocking error.
#[derive(Debug, PartialEq)]
pub struct GroupFailure {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub error: EngineError,
}

/// Aggregation output: clean totals plus per-ingredient failures.
#[derive(Debug, Default, PartialEq)]
pub struct AggregationReport {
    pub lines: Vec<AggregatedLine>,
    pub failures: Vec<GroupFailure>,
}

fn unit_name(catalog: &UnitCatalog, unit_id: Option<i64>) -> String {
    match unit_id {
        Some(id) => match catalog.unit(id) {
            Ok(unit) => unit.name.clone(),
            Err(_) => format!("unit {id}"),
        },
        None => "(none)".to_string(),
    }
}

/// Aggregates `lines` (already in stable input order: recipe selection
/// order, then line order within each recipe) into per-ingredient totals.
pub(crate) fn aggregate_lines(
    catalog: &UnitCatalog,
    lines: &[RecipeIngredientLine],
    ingredients: &HashMap<i64, Ingredient>,
) -> AggregationReport {
    // Group by ingredient, preserving first-encounter order.
    let mut group_order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Vec<&RecipeIngredientLine>> = HashMap::new();
    for line in lines {
        if !groups.contains_key(&line.ingredient_id) {
            group_order.push(line.ingredient_id);
        }
        groups.entry(line.ingredient_id).or_default().push(line);
    }

    let mut report = AggregationReport::default();

    for ingredient_id in group_order {
        let group = &groups[&ingredient_id];
        let ingredient_name = ingredients
            .get(&ingredient_id)
            .map(|ingredient| ingredient.name.clone())
            .unwrap_or_else(|| format!("ingredient {ingredient_id}"));

        match sum_group(catalog, ingredient_id, group, ingredients.get(&ingredient_id)) {
            Ok(line) => report.lines.push(line),
            Err(error) => report.failures.push(GroupFailure {
                ingredient_id,
                ingredient_name,
                error,
            }),
        }
    }

    report
}

fn sum_group(
    catalog: &UnitCatalog,
    ingredient_id: i64,
    group: &[&RecipeIngredientLine],
    ingredient: Option<&Ingredient>,
) -> Result<AggregatedLine, EngineError> {
    let ingredient = ingredient.ok_or(EngineError::IngredientNotFound { ingredient_id })?;

    // Target unit: the ingredient's standard unit when set, else the unit of
    // the first line in stable input order.
    let first = group[0];
    let target_id = match ingredient.standard_unit {
        Some(unit_id) => unit_id,
        None => first.unit_id.ok_or(EngineError::UnitMismatch {
            recipe_id: first.recipe_id,
            ingredient_id,
            line_unit: unit_name(catalog, None),
            target_unit: unit_name(catalog, None),
        })?,
    };
    let target = catalog.unit(target_id)?;

    let mut total = Quantity::ZERO;
    let mut recipe_ids: Vec<i64> = Vec::new();

    for line in group {
        let mismatch = || EngineError::UnitMismatch {
            recipe_id: line.recipe_id,
            ingredient_id,
            line_unit: unit_name(catalog, line.unit_id),
            target_unit: target.name.clone(),
        };

        let unit_id = line.unit_id.ok_or_else(mismatch)?;
        let quantity = line.quantity.ok_or_else(|| {
            EngineError::InvalidQuantity(format!(
                "recipe {}: line for ingredient {ingredient_id} has no quantity",
                line.recipe_id
            ))
        })?;

        let converted = catalog
            .convert(quantity, unit_id, target_id, Some(ingredient))
            .map_err(|error| match error {
                // Unknown unit ids keep their own kind; everything the line
                // cannot bridge becomes a mismatch naming the line.
                EngineError::UnitNotFound { .. } => error,
                _ => mismatch(),
            })?;

        total = converted
            .checked_add(total)
            .ok_or_else(|| EngineError::InvalidQuantity("aggregated total overflow".to_string()))?;

        if !recipe_ids.contains(&line.recipe_id) {
            recipe_ids.push(line.recipe_id);
        }
    }

    Ok(AggregatedLine {
        ingredient_id,
        ingredient_name: ingredient.name.clone(),
        total,
        unit_id: target_id,
        unit_name: target.name.clone(),
        recipe_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(id: i64, name: &str, standard_unit: Option<i64>, density: Option<&str>) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            description: None,
            standard_unit,
            density: density.map(|d| d.parse().unwrap()),
        }
    }

    fn line(
        id: i64,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: &str,
        unit: &str,
        catalog: &UnitCatalog,
    ) -> RecipeIngredientLine {
        RecipeIngredientLine {
            id,
            recipe_id,
            ingredient_id,
            quantity: Some(quantity.parse().unwrap()),
            unit_id: Some(catalog.unit_by_name(unit).unwrap().id),
        }
    }

    #[test]
    fn sums_across_recipes_into_standard_unit() {
        let catalog = UnitCatalog::builtin();
        let g = catalog.unit_by_name("g").unwrap().id;
        let flour = ingredient(1, "flour", Some(g), None);
        let ingredients = HashMap::from([(1, flour)]);

        let lines = vec![
            line(1, 10, 1, "500", "g", &catalog),
            line(2, 20, 1, "0.5", "kg", &catalog),
        ];

        let report = aggregate_lines(&catalog, &lines, &ingredients);
        assert!(report.failures.is_empty());
        assert_eq!(report.lines.len(), 1);
        let total = &report.lines[0];
        assert_eq!(total.total, "1000".parse().unwrap());
        assert_eq!(total.unit_name, "g");
        assert_eq!(total.recipe_ids, vec![10, 20]);
    }

    #[test]
    fn first_line_unit_wins_without_standard_unit() {
        let catalog = UnitCatalog::builtin();
        let sugar = ingredient(2, "sugar", None, None);
        let ingredients = HashMap::from([(2, sugar)]);

        let lines = vec![
            line(1, 10, 2, "2", "tbsp", &catalog),
            line(2, 20, 2, "6", "tsp", &catalog),
        ];

        let report = aggregate_lines(&catalog, &lines, &ingredients);
        assert!(report.failures.is_empty());
        let total = &report.lines[0];
        assert_eq!(total.unit_name, "tbsp");
        // 2 tbsp + 6 tsp (= 2 tbsp) = 4 tbsp
        assert_eq!(total.total, "4".parse().unwrap());
    }

    #[test]
    fn density_bridges_inside_a_group() {
        let catalog = UnitCatalog::builtin();
        let ml = catalog.unit_by_name("ml").unwrap().id;
        let oil = ingredient(3, "olive oil", Some(ml), Some("0.5"));
        let ingredients = HashMap::from([(3, oil)]);

        let lines = vec![
            line(1, 10, 3, "100", "ml", &catalog),
            line(2, 20, 3, "50", "g", &catalog),
        ];

        let report = aggregate_lines(&catalog, &lines, &ingredients);
        assert!(report.failures.is_empty());
        // 100 ml + 50 g / (0.5 g/ml) = 200 ml
        assert_eq!(report.lines[0].total, "200".parse().unwrap());
    }

    #[test]
    fn bad_group_does_not_sink_good_group() {
        let catalog = UnitCatalog::builtin();
        let g = catalog.unit_by_name("g").unwrap().id;
        let ingredients = HashMap::from([
            (1, ingredient(1, "flour", Some(g), None)),
            // no density: the ml line cannot reach grams
            (2, ingredient(2, "milk", Some(g), None)),
        ]);

        let lines = vec![
            line(1, 10, 1, "500", "g", &catalog),
            line(2, 10, 2, "200", "ml", &catalog),
        ];

        let report = aggregate_lines(&catalog, &lines, &ingredients);
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].ingredient_id, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ingredient_id, 2);
        assert_eq!(
            report.failures[0].error,
            EngineError::UnitMismatch {
                recipe_id: 10,
                ingredient_id: 2,
                line_unit: "ml".to_string(),
                target_unit: "g".to_string(),
            }
        );
    }

    #[test]
    fn line_without_unit_fails_its_group() {
        let catalog = UnitCatalog::builtin();
        let g = catalog.unit_by_name("g").unwrap().id;
        let ingredients = HashMap::from([(1, ingredient(1, "flour", Some(g), None))]);

        let lines = vec![RecipeIngredientLine {
            id: 1,
            recipe_id: 10,
            ingredient_id: 1,
            quantity: Some("2".parse().unwrap()),
            unit_id: None,
        }];

        let report = aggregate_lines(&catalog, &lines, &ingredients);
        assert!(report.lines.is_empty());
        assert!(matches!(
            report.failures[0].error,
            EngineError::UnitMismatch { ref line_unit, .. } if line_unit == "(none)"
        ));
    }

    #[test]
    fn distinct_count_units_do_not_mix() {
        let catalog = UnitCatalog::builtin();
        let ingredients = HashMap::from([(4, ingredient(4, "eggs", None, None))]);

        let lines = vec![
            line(1, 10, 4, "6", "piece", &catalog),
            line(2, 20, 4, "2", "slice", &catalog),
        ];

        let report = aggregate_lines(&catalog, &lines, &ingredients);
        assert!(report.lines.is_empty());
        assert!(matches!(
            report.failures[0].error,
            EngineError::UnitMismatch { recipe_id: 20, .. }
        ));
    }

    #[test]
    fn totals_do_not_depend_on_recipe_order() {
        let catalog = UnitCatalog::builtin();
        let g = catalog.unit_by_name("g").unwrap().id;
        let ingredients = HashMap::from([(1, ingredient(1, "flour", Some(g), None))]);

        let forward = vec![
            line(1, 10, 1, "100", "g", &catalog),
            line(2, 20, 1, "1", "kg", &catalog),
        ];
        let backward = vec![
            line(2, 20, 1, "1", "kg", &catalog),
            line(1, 10, 1, "100", "g", &catalog),
        ];

        let a = aggregate_lines(&catalog, &forward, &ingredients);
        let b = aggregate_lines(&catalog, &backward, &ingredients);
        assert_eq!(a.lines[0].total, b.lines[0].total);
        assert_eq!(a.lines[0].recipe_ids, vec![10, 20]);
        assert_eq!(b.lines[0].recipe_ids, vec![20, 10]);
    }
}
