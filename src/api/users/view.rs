//! Shared user profile serialization.

use crate::api::recipes::view::{author_recipes, ShortRecipe};
use crate::models::User;
use crate::schema::{follows, recipes};
use diesel::dsl::exists;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    /// URL of the stored avatar, or null when none was uploaded
    pub avatar: Option<String>,
}

pub fn avatar_url(base_url: &str, user: &User) -> Option<String> {
    user.avatar
        .as_ref()
        .map(|_| format!("{}/api/users/{}/avatar", base_url, user.id))
}

/// Whether `viewer` follows `author`. Anonymous viewers are never subscribed.
pub fn is_subscribed(
    conn: &mut PgConnection,
    viewer: Option<Uuid>,
    author_id: Uuid,
) -> QueryResult<bool> {
    let Some(viewer_id) = viewer else {
        return Ok(false);
    };
    if viewer_id == author_id {
        return Ok(false);
    }
    diesel::select(exists(
        follows::table
            .filter(follows::user_id.eq(viewer_id))
            .filter(follows::author_id.eq(author_id)),
    ))
    .get_result(conn)
}

pub fn profile(
    conn: &mut PgConnection,
    base_url: &str,
    viewer: Option<Uuid>,
    user: &User,
) -> QueryResult<UserProfile> {
    Ok(UserProfile {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed: is_subscribed(conn, viewer, user.id)?,
        avatar: avatar_url(base_url, user),
    })
}

/// Profile plus the author's recipes, as returned by the follow endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FollowedAuthor {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
    pub recipes: Vec<ShortRecipe>,
    pub recipes_count: i64,
}

pub fn followed_author(
    conn: &mut PgConnection,
    base_url: &str,
    viewer: Option<Uuid>,
    user: &User,
    recipes_limit: Option<i64>,
) -> QueryResult<FollowedAuthor> {
    let profile = profile(conn, base_url, viewer, user)?;
    let recipes = author_recipes(conn, base_url, user.id, recipes_limit)?;
    let recipes_count: i64 = recipes::table
        .filter(recipes::author_id.eq(user.id))
        .count()
        .get_result(conn)?;

    Ok(FollowedAuthor {
        id: profile.id,
        email: profile.email,
        username: profile.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
        is_subscribed: profile.is_subscribed,
        avatar: profile.avatar,
        recipes,
        recipes_count,
    })
}
