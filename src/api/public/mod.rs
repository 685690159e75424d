pub mod auth;
pub mod redirect;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(auth::signup::signup))
        .route("/api/auth/login", post(auth::login::login))
        .route("/a/r/{url_hash}", get(redirect::redirect_by_hash))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup::signup,
        auth::login::login,
        redirect::redirect_by_hash,
    ),
    components(schemas(
        auth::signup::SignupRequest,
        auth::signup::SignupResponse,
        auth::login::LoginRequest,
        auth::login::LoginResponse,
    ))
)]
pub struct ApiDoc;
