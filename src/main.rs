use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use profit_automation::{
    AppState,
    config::{AutomationConfig, ENV_DATABASE_URL},
    handlers::app_router,
    jobs::profit_cycle_sync::start_profit_cycle_job,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,profit_automation=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AutomationConfig::from_env();

    // Connect to database
    let database_url = env::var(ENV_DATABASE_URL).expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    if config.printful_api_key.is_none() {
        tracing::info!("No fulfillment API key configured, order sync will simulate orders");
    }

    let state = AppState::from_config(db.clone(), config.clone());

    if config.scheduler_enabled {
        tracing::info!(
            interval_secs = config.cycle_interval_secs,
            "Starting profit cycle scheduler"
        );
        start_profit_cycle_job(db, state.cycle.clone(), config.cycle_interval_secs).await;
    } else {
        tracing::info!("Profit cycle scheduler disabled");
    }

    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .expect("Failed to bind address");

    tracing::info!("Server listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await
        .expect("Server error");
}
