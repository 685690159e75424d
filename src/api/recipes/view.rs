//! Shared recipe serialization: full and short representations plus the
//! per-viewer favorite/cart flags.

use crate::api::users::view::{profile, UserProfile};
use crate::models::{Recipe, User};
use crate::schema::{favorites, ingredients, recipe_ingredients, recipes, shopping_carts};
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// One (ingredient, amount) line of a recipe, in insertion order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientLine {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub name: String,
    pub author: UserProfile,
    pub description: String,
    /// URL of the stored recipe photo
    pub image: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<IngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Short form used by favorite/cart responses and subscription listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortRecipe {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

pub fn image_url(base_url: &str, recipe_id: Uuid) -> String {
    format!("{}/api/recipes/{}/image", base_url, recipe_id)
}

pub fn load_lines(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<Vec<IngredientLine>> {
    let rows: Vec<(i32, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe_id))
        .order(recipe_ingredients::id.asc())
        .select((
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(id, name, measurement_unit, amount)| IngredientLine {
            id,
            name,
            measurement_unit,
            amount,
        })
        .collect())
}

/// (is_favorited, is_in_shopping_cart) for the viewing user; both false for
/// anonymous viewers.
pub fn viewer_flags(
    conn: &mut PgConnection,
    viewer: Option<Uuid>,
    recipe_id: Uuid,
) -> QueryResult<(bool, bool)> {
    let Some(viewer_id) = viewer else {
        return Ok((false, false));
    };

    let is_favorited = diesel::select(exists(
        favorites::table
            .filter(favorites::user_id.eq(viewer_id))
            .filter(favorites::recipe_id.eq(recipe_id)),
    ))
    .get_result(conn)?;

    let is_in_shopping_cart = diesel::select(exists(
        shopping_carts::table
            .filter(shopping_carts::user_id.eq(viewer_id))
            .filter(shopping_carts::recipe_id.eq(recipe_id)),
    ))
    .get_result(conn)?;

    Ok((is_favorited, is_in_shopping_cart))
}

pub fn recipe_response(
    conn: &mut PgConnection,
    base_url: &str,
    viewer: Option<Uuid>,
    recipe: &Recipe,
    author: &User,
) -> QueryResult<RecipeResponse> {
    let ingredients = load_lines(conn, recipe.id)?;
    let (is_favorited, is_in_shopping_cart) = viewer_flags(conn, viewer, recipe.id)?;

    Ok(RecipeResponse {
        id: recipe.id,
        name: recipe.name.clone(),
        author: profile(conn, base_url, viewer, author)?,
        description: recipe.description.clone(),
        image: image_url(base_url, recipe.id),
        cooking_time: recipe.cooking_time,
        created_at: recipe.created_at,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
    })
}

pub fn short_recipe(base_url: &str, recipe: &Recipe) -> ShortRecipe {
    ShortRecipe {
        id: recipe.id,
        name: recipe.name.clone(),
        image: image_url(base_url, recipe.id),
        cooking_time: recipe.cooking_time,
    }
}

/// Short-form recipes by one author, newest first.
pub fn author_recipes(
    conn: &mut PgConnection,
    base_url: &str,
    author_id: Uuid,
    limit: Option<i64>,
) -> QueryResult<Vec<ShortRecipe>> {
    let mut query = recipes::table
        .filter(recipes::author_id.eq(author_id))
        .select((recipes::id, recipes::name, recipes::cooking_time))
        .order(recipes::created_at.desc())
        .into_boxed();

    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let rows: Vec<(Uuid, String, i32)> = query.load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(id, name, cooking_time)| ShortRecipe {
            image: image_url(base_url, id),
            id,
            name,
            cooking_time,
        })
        .collect())
}
