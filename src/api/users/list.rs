use crate::api::ErrorResponse;
use crate::auth::MaybeAuthUser;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
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

use super::view::{profile, UserProfile};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Number of users to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of users to skip (default: 0)
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListUsersResponse {
    pub count: i64,
    pub results: Vec<UserProfile>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Paginated user list", body = ListUsersResponse),
    )
)]
pub async fn list_users(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);
    let viewer_id = viewer.as_ref().map(|u| u.id);

    let mut conn = get_conn!(state.pool);

    let count: i64 = match users::table.count().get_result(&mut conn) {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to count users: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let rows: Vec<User> = match users::table
        .order(users::username.asc())
        .limit(limit)
        .offset(offset)
        .select(User::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to list users: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut results = Vec::with_capacity(rows.len());
    for user in &rows {
        match profile(&mut conn, &state.base_url, viewer_id, user) {
            Ok(entry) => results.push(entry),
            Err(e) => {
                tracing::error!("Failed to serialize profile {}: {}", user.id, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to list users".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    (StatusCode::OK, Json(ListUsersResponse { count, results })).into_response()
}
