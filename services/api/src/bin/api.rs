//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MemoryStore, PostgrestStore},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{
        clear_night_handler, create_night_tail_handler, create_temp_log_handler,
        dashboard_handler, list_night_tails_handler, list_temp_logs_handler, mark_in_handler,
        record_purge_handler, rest::ApiDoc, state::AppState, update_heat_source_handler,
    },
};
use axum::{
    routing::{get, post, put},
    Router,
};
use night_ops_core::ports::NightOpsStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select the Storage Backend ---
    let store: Arc<dyn NightOpsStore> = match config.backend {
        StorageBackend::Memory => {
            info!("Using the in-memory storage backend");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Postgrest => {
            let url = config.supabase_url.clone().ok_or_else(|| {
                ApiError::Internal("SUPABASE_URL is required for the postgrest backend".to_string())
            })?;
            let key = config.supabase_anon_key.clone().ok_or_else(|| {
                ApiError::Internal(
                    "SUPABASE_ANON_KEY is required for the postgrest backend".to_string(),
                )
            })?;
            info!("Using the PostgREST storage backend at {}", url);
            Arc::new(PostgrestStore::new(url, key))
        }
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route(
            "/night-tails",
            get(list_night_tails_handler)
                .post(create_night_tail_handler)
                .delete(clear_night_handler),
        )
        .route("/night-tails/{id}/mark-in", post(mark_in_handler))
        .route("/night-tails/{id}/purge", post(record_purge_handler))
        .route("/night-tails/{id}/heat-source", put(update_heat_source_handler))
        .route(
            "/temp-logs",
            get(list_temp_logs_handler).post(create_temp_log_handler),
        )
        .route("/dashboard", get(dashboard_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
