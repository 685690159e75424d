use crate::api::ErrorResponse;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListIngredientsParams {
    /// Case-insensitive name prefix filter
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "List of ingredients", body = [Ingredient]),
    )
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(params): Query<ListIngredientsParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(state.pool);

    let mut query = ingredients::table
        .select(Ingredient::as_select())
        .order(ingredients::name.asc())
        .into_boxed();

    if let Some(name) = params.name.as_deref() {
        if !name.is_empty() {
            query = query.filter(ingredients::name.ilike(format!("{}%", name)));
        }
    }

    let rows: Vec<Ingredient> = match query.load(&mut conn) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to list ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list ingredients".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(rows)).into_response()
}
