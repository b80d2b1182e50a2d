mod config;
mod docs;
mod handlers;
mod models;
mod protocol;
mod registry;
mod routes;
mod server;
mod state;
mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use routes::create_api_routes;
use docs::ApiDoc;
use config::Config;
use state::AppState;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use std::panic;
use std::sync::Arc;

#[tokio::main]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Configuration decides the default log level, so it is read first and
    // any failure is reported once logging is up
    let loaded = Config::load();
    let log_level = loaded
        .as_ref()
        .map(|config| config.log_level.clone())
        .unwrap_or_else(|_| Config::default().log_level);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("colabri_rtce={log_level},tower_http=debug,info").into()
        }))
        .init();

    info!("Starting server...");

    let config = loaded.unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    let state = Arc::new(AppState::new(&config));

    if config.admin_enabled {
        spawn_admin_api(&config, state.clone()).await;
    } else {
        info!("Admin API disabled");
    }

    // Start the editing server; failing to bind is the only way out
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Editing server running on {}", config.server_address());

    server::serve(listener, state, config.max_line_length).await;
}

/// Serves the read-only admin API in the background. A bind failure is logged
/// and the editing server starts regardless.
async fn spawn_admin_api(config: &Config, state: Arc<AppState>) {
    let mut app_routes = Router::new()
        // Mount API routes
        .nest("/api", create_api_routes(state));

    if config.is_development() {
        // Mount Swagger UI
        app_routes = app_routes
            .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    // Add tracing layer
    let app_routes = app_routes.layer(TraceLayer::new_for_http());

    let admin_address = config.admin_address();
    let listener = match tokio::net::TcpListener::bind(&admin_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind admin API to {}: {}", admin_address, e);
            return;
        }
    };

    info!("📊 Admin API running on http://{}", admin_address);
    if config.is_development() {
        info!("📚 Swagger UI available at http://{}/swagger", admin_address);
    }

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app_routes).await {
            error!("Admin API error: {}", e);
        }
    });
}
