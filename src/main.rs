mod api;
mod auth;
mod cache;
mod db;
mod image;
mod models;
mod schema;
mod shortlink;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::Router;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

/// Shopping-list exports are cached per user for five minutes; a stale list
/// shortly after a cart change is acceptable.
const SHOPPING_LIST_CACHE_TTL: Duration = Duration::from_secs(300);

/// Short-link redirects resolve hash -> recipe id through this cache for an
/// hour before falling back to the table.
const SHORT_LINK_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Application state shared across all handlers
pub struct ServerState {
    pub pool: db::DbPool,
    pub base_url: String,
    pub shopping_lists: cache::TtlCache<Uuid, String>,
    pub short_links: cache::TtlCache<String, Uuid>,
}

pub type AppState = Arc<ServerState>;

fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi().to_pretty_json().unwrap();
        println!("{}", spec);
        return;
    }

    init_telemetry();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let state: AppState = Arc::new(ServerState {
        pool: db::create_pool(&database_url),
        base_url,
        shopping_lists: cache::TtlCache::new(SHOPPING_LIST_CACHE_TTL),
        short_links: cache::TtlCache::new(SHORT_LINK_CACHE_TTL),
    });

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let app = Router::new()
        .merge(api::public::router())
        .nest("/api/ingredients", api::ingredients::router())
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/users", api::users::router())
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());
    tracing::info!("Swagger UI available at /swagger-ui/");

    axum::serve(listener, app).await.unwrap();
}
