//! OpenCards Backend
//!
//! REST backend for a plane-spotting collectible card game, with SQLite
//! persistence and a small server-rendered deck gallery.

mod api;
mod auth;
mod config;
mod db;
mod deck;
mod economy;
mod errors;
mod models;
mod progression;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use deck::ModelCatalog;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub models: Arc<ModelCatalog>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting OpenCards Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.token_secret_generated {
        tracing::warn!(
            "No token secret configured (OPENCARDS_TOKEN_SECRET). Using a random per-process secret"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Load aircraft models for the deck view
    let models = ModelCatalog::load(config.models_path.as_deref()).await?;
    tracing::info!(
        updated_at = models.updated_at(),
        "Loaded {} aircraft models",
        models.len()
    );

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
        models: Arc::new(models),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let require_user = middleware::from_fn_with_state(state.clone(), auth::require_user);

    // Routes that require a bearer token
    let authed_routes = Router::new()
        .route("/users/refresh", get(api::refresh))
        .route("/users/name", post(api::rename))
        .route("/users/consume/photo", post(api::consume_photo))
        .route("/users/purchase", post(api::purchase_boost))
        .route("/users/relocate", post(api::relocate))
        .route("/captures/3", post(api::submit_capture))
        .route("/items/purchase", post(api::purchase_item))
        .route("/items/remove/{type}", delete(api::remove_item))
        .layer(require_user.clone());

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/users/create", post(api::signup))
        // Login is public, reading and patching the profile are not
        .route(
            "/users",
            post(api::login).merge(
                get(api::get_user)
                    .patch(api::update_messaging_token)
                    .layer(require_user),
            ),
        )
        .route("/items", get(api::list_items))
        .route("/battle/rules/{iso_year_week}", get(api::get_battle_rules))
        .route("/app/login", get(api::login_page).post(api::login_submit))
        .route("/app/deck", get(api::deck_page));

    Router::new()
        .merge(authed_routes)
        .merge(public_routes)
        .fallback(api::route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
