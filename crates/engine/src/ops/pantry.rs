//! Pantry accounting: one owned quantity per (user, ingredient) key.
//!
//! Every mutation is a read-modify-write executed inside one DB transaction
//! with a compare-and-swap guard on the quantity that was read. A lost race
//! surfaces as [`EngineError::Conflict`]; the engine never retries on its
//! own. Keys never contend with each other.

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*};

use crate::{
    EngineError, PantryEntry, Quantity, RemoveOutcome, ResultEngine, pantry_entries,
};

use super::{Engine, with_tx};

const INSERT_IF_ABSENT: &str = "INSERT INTO pantry_entries \
     (user_id, ingredient_id, quantity_micro, unit_id) VALUES (?, ?, ?, ?) \
     ON CONFLICT (user_id, ingredient_id) DO NOTHING";

const UPDATE_IF_UNCHANGED: &str = "UPDATE pantry_entries SET quantity_micro = ? \
     WHERE user_id = ? AND ingredient_id = ? AND quantity_micro = ?";

const DELETE_IF_UNCHANGED: &str = "DELETE FROM pantry_entries \
     WHERE user_id = ? AND ingredient_id = ? AND quantity_micro = ?";

fn ensure_effective(converted: Quantity) -> ResultEngine<()> {
    if !converted.is_positive() {
        return Err(EngineError::InvalidQuantity(
            "quantity rounds to zero in the storage unit".to_string(),
        ));
    }
    Ok(())
}

fn conflict() -> EngineError {
    EngineError::Conflict("pantry entry changed concurrently".to_string())
}

impl Engine {
    /// Add `delta` (in `unit_id`) to what the user owns of an ingredient.
    ///
    /// Merge-on-add: an absent key becomes `delta`, a present key is
    /// incremented. The stored value lives in the ingredient standard unit
    /// when one is set; otherwise the first add fixes the row's unit and
    /// later deltas convert into it.
    pub async fn add_to_pantry(
        &self,
        user_id: &str,
        ingredient_id: i64,
        delta: Quantity,
        unit_id: i64,
    ) -> ResultEngine<PantryEntry> {
        if !delta.is_positive() {
            return Err(EngineError::InvalidQuantity(
                "added quantity must be > 0".to_string(),
            ));
        }
        let ingredient = self.require_ingredient(ingredient_id).await?;
        self.catalog.unit(unit_id)?;
        let backend = self.database.get_database_backend();

        with_tx!(self, |db_tx| {
            let existing = pantry_entries::Entity::find_by_id((user_id.to_string(), ingredient_id))
                .one(&db_tx)
                .await?;

            match existing {
                Some(row) => {
                    let converted =
                        self.catalog
                            .convert(delta, unit_id, row.unit_id, Some(&ingredient))?;
                    ensure_effective(converted)?;
                    let updated = row
                        .quantity_micro
                        .checked_add(converted.micro())
                        .ok_or_else(|| {
                            EngineError::InvalidQuantity("pantry quantity overflow".to_string())
                        })?;

                    let result = db_tx
                        .execute(Statement::from_sql_and_values(
                            backend,
                            UPDATE_IF_UNCHANGED,
                            [
                                updated.into(),
                                user_id.into(),
                                ingredient_id.into(),
                                row.quantity_micro.into(),
                            ],
                        ))
                        .await?;
                    if result.rows_affected() != 1 {
                        return Err(conflict());
                    }

                    Ok(PantryEntry {
                        user_id: user_id.to_string(),
                        ingredient_id,
                        quantity: Quantity::from_micro(updated),
                        unit_id: row.unit_id,
                    })
                }
                None => {
                    let storage_unit = ingredient.standard_unit.unwrap_or(unit_id);
                    let converted =
                        self.catalog
                            .convert(delta, unit_id, storage_unit, Some(&ingredient))?;
                    ensure_effective(converted)?;

                    let result = db_tx
                        .execute(Statement::from_sql_and_values(
                            backend,
                            INSERT_IF_ABSENT,
                            [
                                user_id.into(),
                                ingredient_id.into(),
                                converted.micro().into(),
                                storage_unit.into(),
                            ],
                        ))
                        .await?;
                    if result.rows_affected() != 1 {
                        return Err(conflict());
                    }

                    Ok(PantryEntry {
                        user_id: user_id.to_string(),
                        ingredient_id,
                        quantity: converted,
                        unit_id: storage_unit,
                    })
                }
            }
        })
    }

    /// Remove `delta` (in `unit_id`) from what the user owns.
    ///
    /// An absent key fails with [`EngineError::PantryNotFound`]. A removal
    /// that would leave zero or less deletes the row and reports
    /// [`RemoveOutcome::Deleted`]; a non-positive quantity is never stored.
    pub async fn remove_from_pantry(
        &self,
        user_id: &str,
        ingredient_id: i64,
        delta: Quantity,
        unit_id: i64,
    ) -> ResultEngine<RemoveOutcome> {
        if !delta.is_positive() {
            return Err(EngineError::InvalidQuantity(
                "removed quantity must be > 0".to_string(),
            ));
        }
        let ingredient = self.require_ingredient(ingredient_id).await?;
        self.catalog.unit(unit_id)?;
        let backend = self.database.get_database_backend();

        with_tx!(self, |db_tx| {
            let row = pantry_entries::Entity::find_by_id((user_id.to_string(), ingredient_id))
                .one(&db_tx)
                .await?
                .ok_or(EngineError::PantryNotFound { ingredient_id })?;

            let converted = self
                .catalog
                .convert(delta, unit_id, row.unit_id, Some(&ingredient))?;
            ensure_effective(converted)?;

            let remaining = row
                .quantity_micro
                .checked_sub(converted.micro())
                .ok_or_else(|| {
                    EngineError::InvalidQuantity("pantry quantity overflow".to_string())
                })?;

            if remaining > 0 {
                let result = db_tx
                    .execute(Statement::from_sql_and_values(
                        backend,
                        UPDATE_IF_UNCHANGED,
                        [
                            remaining.into(),
                            user_id.into(),
                            ingredient_id.into(),
                            row.quantity_micro.into(),
                        ],
                    ))
                    .await?;
                if result.rows_affected() != 1 {
                    return Err(conflict());
                }

                Ok(RemoveOutcome::Remaining(PantryEntry {
                    user_id: user_id.to_string(),
                    ingredient_id,
                    quantity: Quantity::from_micro(remaining),
                    unit_id: row.unit_id,
                }))
            } else {
                let result = db_tx
                    .execute(Statement::from_sql_and_values(
                        backend,
                        DELETE_IF_UNCHANGED,
                        [
                            user_id.into(),
                            ingredient_id.into(),
                            row.quantity_micro.into(),
                        ],
                    ))
                    .await?;
                if result.rows_affected() != 1 {
                    return Err(conflict());
                }

                Ok(RemoveOutcome::Deleted)
            }
        })
    }

    /// Drop a pantry entry regardless of its current quantity.
    pub async fn clear_pantry_entry(&self, user_id: &str, ingredient_id: i64) -> ResultEngine<()> {
        pantry_entries::Entity::delete_many()
            .filter(pantry_entries::Column::UserId.eq(user_id))
            .filter(pantry_entries::Column::IngredientId.eq(ingredient_id))
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// The owned quantity for one key; `None` means the user owns nothing.
    pub async fn pantry_entry(
        &self,
        user_id: &str,
        ingredient_id: i64,
    ) -> ResultEngine<Option<PantryEntry>> {
        let model = pantry_entries::Entity::find_by_id((user_id.to_string(), ingredient_id))
            .one(&self.database)
            .await?;
        Ok(model.map(Into::into))
    }

    /// Everything the user owns, ordered by ingredient id.
    pub async fn list_pantry(&self, user_id: &str) -> ResultEngine<Vec<PantryEntry>> {
        let models = pantry_entries::Entity::find()
            .filter(pantry_entries::Column::UserId.eq(user_id))
            .order_by_asc(pantry_entries::Column::IngredientId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
