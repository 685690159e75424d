use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::models::User;
use crate::schema::{follows, users};
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

use super::view::{followed_author, FollowedAuthor};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubscriptionsParams {
    /// Number of authors to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of authors to skip (default: 0)
    pub offset: Option<i64>,
    /// Cap on the number of recipes returned per author
    pub recipes_limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionsResponse {
    pub count: i64,
    pub results: Vec<FollowedAuthor>,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(SubscriptionsParams),
    responses(
        (status = 200, description = "Authors the caller follows", body = SubscriptionsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SubscriptionsParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut conn = get_conn!(state.pool);

    let count: i64 = match follows::table
        .filter(follows::user_id.eq(user.id))
        .count()
        .get_result(&mut conn)
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to count subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let authors: Vec<User> = match follows::table
        .filter(follows::user_id.eq(user.id))
        .inner_join(users::table.on(users::id.eq(follows::author_id)))
        .order(users::username.asc())
        .limit(limit)
        .offset(offset)
        .select(User::as_select())
        .load(&mut conn)
    {
        Ok(authors) => authors,
        Err(e) => {
            tracing::error!("Failed to list subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut results = Vec::with_capacity(authors.len());
    for author in &authors {
        match followed_author(
            &mut conn,
            &state.base_url,
            Some(user.id),
            author,
            params.recipes_limit,
        ) {
            Ok(entry) => results.push(entry),
            Err(e) => {
                tracing::error!("Failed to serialize author {}: {}", author.id, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to list subscriptions".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    (StatusCode::OK, Json(SubscriptionsResponse { count, results })).into_response()
}
