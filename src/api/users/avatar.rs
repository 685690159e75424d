use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::image::decode_data_uri;
use crate::schema::users;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::view::avatar_url;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// Base64 data URI (`data:image/<fmt>;base64,...`)
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    /// URL of the stored avatar, or null when none was uploaded
    pub avatar: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/users/me/avatar",
    tag = "users",
    responses(
        (status = 200, description = "Avatar URL of the authenticated user", body = AvatarResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(AvatarResponse {
            avatar: avatar_url(&state.base_url, &user),
        }),
    )
        .into_response()
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    tag = "users",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(request): Json<AvatarRequest>,
) -> impl IntoResponse {
    let Some(data_uri) = request.avatar.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "An image is required".to_string(),
            }),
        )
            .into_response();
    };

    let image = match decode_data_uri(data_uri) {
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

    if let Err(e) = diesel::update(users::table.find(user.id))
        .set((
            users::avatar.eq(Some(image.data.as_slice())),
            users::avatar_content_type.eq(Some(image.content_type.as_str())),
        ))
        .execute(&mut conn)
    {
        tracing::error!("Failed to update avatar: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to update avatar".to_string(),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(AvatarResponse {
            avatar: Some(format!("{}/api/users/{}/avatar", state.base_url, user.id)),
        }),
    )
        .into_response()
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let mut conn = get_conn!(state.pool);

    if let Err(e) = diesel::update(users::table.find(user.id))
        .set((
            users::avatar.eq(None::<Vec<u8>>),
            users::avatar_content_type.eq(None::<String>),
        ))
        .execute(&mut conn)
    {
        tracing::error!("Failed to delete avatar: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to delete avatar".to_string(),
            }),
        )
            .into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/avatar",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Avatar bytes", content_type = "image/*"),
        (status = 404, description = "User or avatar not found", body = ErrorResponse)
    )
)]
pub async fn serve_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(state.pool);

    let row: (Option<Vec<u8>>, Option<String>) = match users::table
        .find(id)
        .select((users::avatar, users::avatar_content_type))
        .first(&mut conn)
    {
        Ok(row) => row,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch avatar: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch avatar".to_string(),
                }),
            )
                .into_response();
        }
    };

    let (Some(data), Some(content_type)) = row else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Avatar not found".to_string(),
            }),
        )
            .into_response();
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(data))
        .unwrap()
        .into_response()
}
