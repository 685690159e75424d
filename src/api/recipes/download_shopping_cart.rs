use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::schema::{ingredients, recipe_ingredients, shopping_carts};
use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diesel::dsl::sum;
use diesel::prelude::*;

/// One aggregated row: (ingredient name, measurement unit, total amount).
type AggregatedRow = (String, String, Option<i64>);

/// Render the aggregated rows as the tab-delimited shopping list table.
fn format_shopping_list(rows: &[AggregatedRow]) -> String {
    let mut out = String::from("Список покупок\n");
    out.push_str("Ингредиенты\tКоличество\tЕдиницы измерения\n");
    for (name, unit, total) in rows {
        out.push_str(&format!("{}\t{}\t{}\n", name, total.unwrap_or(0), unit));
    }
    out
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Tab-delimited shopping list", content_type = "text/csv"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let content = match state.shopping_lists.get(&user.id) {
        Some(cached) => cached,
        None => {
            let mut conn = get_conn!(state.pool);

            // Sum amounts across every recipe in the caller's cart, one row
            // per (ingredient, unit), sorted by name.
            let rows: Vec<AggregatedRow> = match recipe_ingredients::table
                .inner_join(ingredients::table)
                .filter(
                    recipe_ingredients::recipe_id.eq_any(
                        shopping_carts::table
                            .filter(shopping_carts::user_id.eq(user.id))
                            .select(shopping_carts::recipe_id),
                    ),
                )
                .group_by((ingredients::name, ingredients::measurement_unit))
                .select((
                    ingredients::name,
                    ingredients::measurement_unit,
                    sum(recipe_ingredients::amount),
                ))
                .order(ingredients::name.asc())
                .load(&mut conn)
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!("Failed to aggregate shopping cart: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Failed to build shopping list".to_string(),
                        }),
                    )
                        .into_response();
                }
            };

            let content = format_shopping_list(&rows);
            state.shopping_lists.put(user.id, content.clone());
            content
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"shopping_list.txt\"",
        )
        .body(Body::from(content))
        .unwrap()
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_has_title_and_header() {
        let table = format_shopping_list(&[]);
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("Список покупок"));
        assert_eq!(
            lines.next(),
            Some("Ингредиенты\tКоличество\tЕдиницы измерения")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_format_renders_aggregated_rows() {
        // Two recipes sharing sugar 100 + 50 arrive pre-summed as 150
        let rows = vec![
            ("мука".to_string(), "г".to_string(), Some(300)),
            ("сахар".to_string(), "г".to_string(), Some(150)),
        ];
        let table = format_shopping_list(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[2], "мука\t300\tг");
        assert_eq!(lines[3], "сахар\t150\tг");
    }
}
