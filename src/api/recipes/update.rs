use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::image::decode_data_uri;
use crate::models::Recipe;
use crate::schema::recipes;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::lines::{missing_ingredient, replace_lines, validate_lines, IngredientLineRequest};
use super::view::{recipe_response, RecipeResponse};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Base64 data URI; omitted = keep the current photo
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    /// Omitted = keep the current line items; supplied = full replace
    pub ingredients: Option<Vec<IngredientLineRequest>>,
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the recipe's author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    if let Some(ref name) = request.name {
        if name.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Name cannot be empty".to_string(),
                }),
            )
                .into_response();
        }
    }

    if let Some(ref description) = request.description {
        if description.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Description cannot be empty".to_string(),
                }),
            )
                .into_response();
        }
    }

    if let Some(cooking_time) = request.cooking_time {
        if cooking_time < 1 {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Cooking time must be at least one minute".to_string(),
                }),
            )
                .into_response();
        }
    }

    if let Some(ref lines) = request.ingredients {
        if let Err(e) = validate_lines(lines) {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    }

    let image = match request.image.as_deref() {
        Some(data_uri) => match decode_data_uri(data_uri) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response()
            }
        },
        None => None,
    };

    let mut conn = get_conn!(state.pool);

    let current: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    // Only the author may edit
    if current.author_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "You cannot edit someone else's recipe".to_string(),
            }),
        )
            .into_response();
    }

    // Merge request with current values
    let new_name = request.name.unwrap_or(current.name);
    let new_description = request.description.unwrap_or(current.description);
    let new_cooking_time = request.cooking_time.unwrap_or(current.cooking_time);
    let (new_image, new_image_content_type) = match image {
        Some(decoded) => (decoded.data, decoded.content_type),
        None => (current.image, current.image_content_type),
    };

    // Field update and line-item replacement share one transaction so a
    // failure partway leaves the prior ingredient set intact.
    let result: Result<Result<Recipe, i32>, diesel::result::Error> =
        conn.transaction(|conn| {
            if let Some(ref lines) = request.ingredients {
                if let Some(missing) = missing_ingredient(conn, lines)? {
                    return Ok(Err(missing));
                }
            }

            let recipe: Recipe = diesel::update(recipes::table.find(id))
                .set((
                    recipes::name.eq(new_name.as_str()),
                    recipes::description.eq(new_description.as_str()),
                    recipes::cooking_time.eq(new_cooking_time),
                    recipes::image.eq(new_image.as_slice()),
                    recipes::image_content_type.eq(new_image_content_type.as_str()),
                ))
                .returning(Recipe::as_returning())
                .get_result(conn)?;

            if let Some(ref lines) = request.ingredients {
                replace_lines(conn, id, lines)?;
            }

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
            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match recipe_response(&mut conn, &state.base_url, Some(user.id), &recipe, &user) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize updated recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch updated recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
