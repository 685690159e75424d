use crate::api::ErrorResponse;
use crate::auth::MaybeAuthUser;
use crate::get_conn;
use crate::models::{Recipe, User};
use crate::schema::{favorites, recipes, shopping_carts, users};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::view::{recipe_response, RecipeResponse};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Only recipes by this author (authenticated callers only)
    pub author: Option<Uuid>,
    /// 1 = only recipes the caller favorited (authenticated callers only)
    pub is_favorited: Option<u8>,
    /// 1 = only recipes in the caller's cart (authenticated callers only)
    pub is_in_shopping_cart: Option<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub count: i64,
    pub results: Vec<RecipeResponse>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Paginated recipe list, newest first", body = ListRecipesResponse),
    )
)]
pub async fn list_recipes(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);
    let viewer_id = viewer.as_ref().map(|u| u.id);

    let mut conn = get_conn!(state.pool);

    let mut count_query = recipes::table
        .select(diesel::dsl::count_star())
        .into_boxed();
    let mut page_query = recipes::table
        .inner_join(users::table)
        .select((Recipe::as_select(), User::as_select()))
        .order(recipes::created_at.desc())
        .into_boxed();

    // Relationship filters only make sense for an authenticated caller;
    // anonymous requests get the unfiltered listing.
    if let Some(viewer_id) = viewer_id {
        if let Some(author) = params.author {
            count_query = count_query.filter(recipes::author_id.eq(author));
            page_query = page_query.filter(recipes::author_id.eq(author));
        }
        if params.is_favorited.unwrap_or(0) != 0 {
            count_query = count_query.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(viewer_id))
                        .select(favorites::recipe_id),
                ),
            );
            page_query = page_query.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(viewer_id))
                        .select(favorites::recipe_id),
                ),
            );
        }
        if params.is_in_shopping_cart.unwrap_or(0) != 0 {
            count_query = count_query.filter(
                recipes::id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(viewer_id))
                        .select(shopping_carts::recipe_id),
                ),
            );
            page_query = page_query.filter(
                recipes::id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(viewer_id))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
    }

    let count: i64 = match count_query.get_result(&mut conn) {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to count recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let rows: Vec<(Recipe, User)> = match page_query.limit(limit).offset(offset).load(&mut conn) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to list recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut results = Vec::with_capacity(rows.len());
    for (recipe, author) in &rows {
        match recipe_response(&mut conn, &state.base_url, viewer_id, recipe, author) {
            Ok(response) => results.push(response),
            Err(e) => {
                tracing::error!("Failed to serialize recipe {}: {}", recipe.id, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to list recipes".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    (StatusCode::OK, Json(ListRecipesResponse { count, results })).into_response()
}
