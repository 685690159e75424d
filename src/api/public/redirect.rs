use crate::api::ErrorResponse;
use crate::schema::recipe_short_links;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use diesel::prelude::*;
use uuid::Uuid;

/// Generic not-found response for link visitors. Internal failures are
/// logged but never surfaced on this path.
fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Recipe not found".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/a/r/{url_hash}",
    tag = "short_links",
    params(
        ("url_hash" = String, Path, description = "Short-link hash")
    ),
    responses(
        (status = 302, description = "Redirect to the canonical recipe resource"),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn redirect_by_hash(
    State(state): State<AppState>,
    Path(url_hash): Path<String>,
) -> impl IntoResponse {
    let recipe_id = match state.short_links.get(&url_hash) {
        Some(id) => id,
        None => {
            let mut conn = match state.pool.get() {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Error redirecting hash {}: {}", url_hash, e);
                    return not_found();
                }
            };

            let recipe_id: Uuid = match recipe_short_links::table
                .filter(recipe_short_links::url_hash.eq(&url_hash))
                .select(recipe_short_links::recipe_id)
                .first(&mut conn)
            {
                Ok(id) => id,
                Err(diesel::NotFound) => return not_found(),
                Err(e) => {
                    tracing::error!("Error redirecting hash {}: {}", url_hash, e);
                    return not_found();
                }
            };

            state.short_links.put(url_hash, recipe_id);
            recipe_id
        }
    };

    Redirect::temporary(&format!("{}/api/recipes/{}", state.base_url, recipe_id)).into_response()
}
