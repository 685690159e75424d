use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::view::{profile, UserProfile};

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthUser(user): AuthUser, State(state): State<AppState>) -> impl IntoResponse {
    let mut conn = get_conn!(state.pool);

    match profile(&mut conn, &state.base_url, Some(user.id), &user) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize profile: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch profile".to_string(),
                }),
            )
                .into_response()
        }
    }
}
