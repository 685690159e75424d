use crate::api::ErrorResponse;
use crate::get_conn;
use crate::schema::recipes;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/image",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe photo bytes", content_type = "image/*"),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_image(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let mut conn = get_conn!(state.pool);

    let (data, content_type): (Vec<u8>, String) = match recipes::table
        .find(id)
        .select((recipes::image, recipes::image_content_type))
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
            tracing::error!("Failed to fetch recipe image: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe image".to_string(),
                }),
            )
                .into_response();
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(data))
        .unwrap()
        .into_response()
}
