//! borne-monitor server entry point.
//!
//! Starts the Axum HTTP server over a PostgreSQL-backed store.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use borne_monitor::api;
use borne_monitor::app_state::AppState;
use borne_monitor::auth::TokenKeys;
use borne_monitor::config::MonitorConfig;
use borne_monitor::persistence::Store;
use borne_monitor::persistence::postgres::PostgresStore;
use borne_monitor::service::{AlertService, IngestService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = MonitorConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting borne-monitor");

    // Connect to PostgreSQL and run migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;

    let postgres = PostgresStore::new(pool);
    postgres.run_migrations().await?;
    let store: Arc<dyn Store> = Arc::new(postgres);

    // Build service layer
    let alerts = AlertService::new(Arc::clone(&store));
    let ingest = IngestService::new(Arc::clone(&store), alerts.clone());
    let tokens = TokenKeys::new(&config.jwt_secret, config.jwt_ttl_minutes);

    // Build application state
    let app_state = AppState {
        store,
        ingest,
        alerts,
        tokens,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let app = mount_swagger(app);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "swagger-ui")]
fn mount_swagger(app: Router) -> Router {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", api::ApiDoc::openapi()))
}

#[cfg(not(feature = "swagger-ui"))]
fn mount_swagger(app: Router) -> Router {
    app
}
