pub mod avatar;
pub mod get;
pub mod list;
pub mod me;
pub mod subscribe;
pub mod subscriptions;
pub mod view;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_users))
        .route("/me", get(me::me))
        .route(
            "/me/avatar",
            get(avatar::get_avatar)
                .put(avatar::set_avatar)
                .patch(avatar::set_avatar)
                .delete(avatar::delete_avatar),
        )
        .route("/subscriptions", get(subscriptions::subscriptions))
        .route("/{id}", get(get::get_user))
        .route("/{id}/avatar", get(avatar::serve_avatar))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_users,
        get::get_user,
        me::me,
        avatar::get_avatar,
        avatar::set_avatar,
        avatar::delete_avatar,
        avatar::serve_avatar,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::subscriptions,
    ),
    components(schemas(
        avatar::AvatarRequest,
        avatar::AvatarResponse,
        list::ListUsersResponse,
        subscriptions::SubscriptionsResponse,
        view::UserProfile,
        view::FollowedAuthor,
    ))
)]
pub struct ApiDoc;
