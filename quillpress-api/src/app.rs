/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use quillpress_api::{app::{build_router, AppState}, config::Config};
/// use quillpress_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use quillpress_shared::auth::token::TokenCodec;
use quillpress_shared::store::ContentStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::middleware::{
    auth::{optional_auth, require_auth},
    error_log::log_errors,
};
use crate::routes;

/// Shared application state
///
/// Cloned for every request; all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn ContentStore>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Session token issuer and validator
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, config: Config) -> Self {
        let tokens = TokenCodec::new(&config.jwt.secret, Duration::hours(config.jwt.expire_hours));

        Self {
            store,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        }
    }
}

/// Builds the complete router
///
/// ```text
/// /api
/// ├── /auth
/// │   ├── POST /register
/// │   ├── POST /login
/// │   └── GET  /user                 (auth)
/// ├── /articles
/// │   ├── GET    /                   (optional auth)
/// │   ├── GET    /:slug              (optional auth)
/// │   ├── POST   /                   (auth)
/// │   ├── PUT    /:slug              (auth, author only)
/// │   └── DELETE /:slug              (auth, author only)
/// ├── /categories                    GET public, writes need auth
/// └── /tags                          GET public, writes need auth
/// ```
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(
            Router::new()
                .route("/user", get(routes::auth::current_user))
                .layer(from_fn_with_state(state.clone(), require_auth)),
        );

    let article_reads = Router::new()
        .route("/", get(routes::articles::list_articles))
        .route("/:slug", get(routes::articles::get_article))
        .layer(from_fn_with_state(state.clone(), optional_auth));

    let article_writes = Router::new()
        .route("/", post(routes::articles::create_article))
        .route(
            "/:slug",
            put(routes::articles::update_article)
                .delete(routes::articles::delete_article),
        )
        .layer(from_fn_with_state(state.clone(), require_auth));

    let category_routes = Router::new()
        .route("/", get(routes::categories::list_categories))
        .route("/:slug", get(routes::categories::get_category))
        .merge(
            Router::new()
                .route("/", post(routes::categories::create_category))
                .route(
                    "/:slug",
                    put(routes::categories::update_category)
                        .delete(routes::categories::delete_category),
                )
                .layer(from_fn_with_state(state.clone(), require_auth)),
        );

    let tag_routes = Router::new()
        .route("/", get(routes::tags::list_tags))
        .route("/:slug", get(routes::tags::get_tag))
        .merge(
            Router::new()
                .route("/", post(routes::tags::create_tag))
                .route(
                    "/:slug",
                    put(routes::tags::update_tag).delete(routes::tags::delete_tag),
                )
                .layer(from_fn_with_state(state.clone(), require_auth)),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/articles", article_reads.merge(article_writes))
        .nest("/categories", category_routes)
        .nest("/tags", tag_routes);

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .nest("/api", api_routes)
        .layer(from_fn(log_errors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
