use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::image::decode_data_uri;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

use super::lines::{insert_lines, missing_ingredient, validate_lines, IngredientLineRequest};
use super::view::{recipe_response, RecipeResponse};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub description: String,
    /// Base64 data URI (`data:image/<fmt>;base64,...`)
    pub image: String,
    /// Cooking time in minutes
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientLineRequest>,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    if request.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Name cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if request.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Description cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if request.cooking_time < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Cooking time must be at least one minute".to_string(),
            }),
        )
            .into_response();
    }

    if let Err(e) = validate_lines(&request.ingredients) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    let image = match decode_data_uri(&request.image) {
        Ok(decoded) => decoded,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let mut conn = get_conn!(state.pool);

    // Recipe row and line items are one unit: either all land or none do.
    let result: Result<Result<Recipe, i32>, diesel::result::Error> =
        conn.transaction(|conn| {
            if let Some(id) = missing_ingredient(conn, &request.ingredients)? {
                return Ok(Err(id));
            }

            let new_recipe = NewRecipe {
                author_id: user.id,
                name: &request.name,
                description: &request.description,
                image: &image.data,
                image_content_type: &image.content_type,
                cooking_time: request.cooking_time,
            };

            let recipe: Recipe = diesel::insert_into(recipes::table)
                .values(&new_recipe)
                .returning(Recipe::as_returning())
                .get_result(conn)?;

            insert_lines(conn, recipe.id, &request.ingredients)?;

            Ok(Ok(recipe))
        });

    let recipe = match result {
        Ok(Ok(recipe)) => recipe,
        Ok(Err(ingredient_id)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Ingredient with id {} does not exist", ingredient_id),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match recipe_response(&mut conn, &state.base_url, Some(user.id), &recipe, &user) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize created recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch created recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
