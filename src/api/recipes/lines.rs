//! Validation and persistence of a recipe's ingredient line items.
//!
//! A recipe and its lines form one unit of consistency: lines are inserted
//! with the recipe in the same transaction, and an update that supplies
//! lines replaces the whole set (delete-all-then-insert-all, not a merge).

use crate::models::NewRecipeIngredient;
use crate::schema::{ingredients, recipe_ingredients};
use diesel::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientLineRequest {
    /// Ingredient ID
    pub id: i32,
    pub amount: i32,
}

#[derive(Error, Debug, PartialEq)]
pub enum LineItemsError {
    #[error("At least one ingredient is required")]
    NoIngredients,

    #[error("Ingredients cannot repeat")]
    DuplicateIngredient,

    #[error("Ingredient amounts must be at least 1")]
    BadAmount,
}

/// Structural validation: non-empty, no repeated ingredient id, amounts >= 1.
pub fn validate_lines(lines: &[IngredientLineRequest]) -> Result<(), LineItemsError> {
    if lines.is_empty() {
        return Err(LineItemsError::NoIngredients);
    }

    let mut seen = HashSet::new();
    for line in lines {
        if !seen.insert(line.id) {
            return Err(LineItemsError::DuplicateIngredient);
        }
        if line.amount < 1 {
            return Err(LineItemsError::BadAmount);
        }
    }

    Ok(())
}

/// First referenced ingredient id that does not exist, if any.
pub fn missing_ingredient(
    conn: &mut PgConnection,
    lines: &[IngredientLineRequest],
) -> QueryResult<Option<i32>> {
    let ids: Vec<i32> = lines.iter().map(|line| line.id).collect();
    let found: HashSet<i32> = ingredients::table
        .filter(ingredients::id.eq_any(&ids))
        .select(ingredients::id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();

    Ok(ids.into_iter().find(|id| !found.contains(id)))
}

/// Insert all lines as one batch. Caller supplies the transaction.
pub fn insert_lines(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    lines: &[IngredientLineRequest],
) -> QueryResult<()> {
    let rows: Vec<NewRecipeIngredient> = lines
        .iter()
        .map(|line| NewRecipeIngredient {
            recipe_id,
            ingredient_id: line.id,
            amount: line.amount,
        })
        .collect();

    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

/// Replace the full line-item set. Caller supplies the transaction so a
/// failure partway leaves the prior set intact.
pub fn replace_lines(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    lines: &[IngredientLineRequest],
) -> QueryResult<()> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    insert_lines(conn, recipe_id, lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, amount: i32) -> IngredientLineRequest {
        IngredientLineRequest { id, amount }
    }

    #[test]
    fn test_valid_lines_accepted() {
        assert_eq!(validate_lines(&[line(1, 200), line(2, 50)]), Ok(()));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(validate_lines(&[]), Err(LineItemsError::NoIngredients));
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        // Repeated id fails regardless of amount values
        assert_eq!(
            validate_lines(&[line(1, 100), line(1, 50)]),
            Err(LineItemsError::DuplicateIngredient)
        );
        assert_eq!(
            validate_lines(&[line(1, 100), line(2, 30), line(1, 100)]),
            Err(LineItemsError::DuplicateIngredient)
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert_eq!(
            validate_lines(&[line(1, 0)]),
            Err(LineItemsError::BadAmount)
        );
        assert_eq!(
            validate_lines(&[line(1, 5), line(2, -3)]),
            Err(LineItemsError::BadAmount)
        );
    }
}
