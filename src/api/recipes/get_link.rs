use crate::api::ErrorResponse;
use crate::get_conn;
use crate::models::NewRecipeShortLink;
use crate::schema::{recipe_short_links, recipes};
use crate::shortlink::generate_hash;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Salted retries after a stored-hash collision before giving up.
const MAX_HASH_ATTEMPTS: u32 = 4;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    tag = "short_links",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Short link for the recipe", body = ShortLinkResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_link(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let mut conn = get_conn!(state.pool);

    let (name, created_at): (String, DateTime<Utc>) = match recipes::table
        .find(id)
        .select((recipes::name, recipes::created_at))
        .first(&mut conn)
    {
        Ok(row) => row,
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

    match lookup_or_create(&mut conn, id, &name, created_at) {
        Ok(Some(url_hash)) => (
            StatusCode::OK,
            Json(ShortLinkResponse {
                short_link: format!("{}/a/r/{}", state.base_url, url_hash),
            }),
        )
            .into_response(),
        Ok(None) => {
            tracing::error!(
                "Gave up creating a short link for recipe {} after {} collisions",
                id,
                MAX_HASH_ATTEMPTS
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create short link".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create short link for recipe {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create short link".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Return the recipe's stored hash, creating it on first request, or `None`
/// when every attempt collided.
///
/// Generation is idempotent: an existing link is returned unchanged. A
/// url_hash unique violation means either a concurrent request created this
/// recipe's link (take theirs) or another recipe holds the token (retry
/// with a salted input).
fn lookup_or_create(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    name: &str,
    created_at: DateTime<Utc>,
) -> Result<Option<String>, diesel::result::Error> {
    if let Some(existing) = find_existing(conn, recipe_id)? {
        return Ok(Some(existing));
    }

    for salt in 0..MAX_HASH_ATTEMPTS {
        let url_hash = generate_hash(recipe_id, name, created_at, salt);
        let new_link = NewRecipeShortLink {
            recipe_id,
            url_hash: &url_hash,
        };

        match diesel::insert_into(recipe_short_links::table)
            .values(&new_link)
            .execute(conn)
        {
            Ok(_) => return Ok(Some(url_hash)),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => {
                if let Some(existing) = find_existing(conn, recipe_id)? {
                    return Ok(Some(existing));
                }
                tracing::warn!(
                    "Short-link hash collision for recipe {} (attempt {})",
                    recipe_id,
                    salt + 1
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(None)
}

fn find_existing(
    conn: &mut PgConnection,
    recipe_id: Uuid,
) -> Result<Option<String>, diesel::result::Error> {
    recipe_short_links::table
        .filter(recipe_short_links::recipe_id.eq(recipe_id))
        .select(recipe_short_links::url_hash)
        .first(conn)
        .optional()
}
