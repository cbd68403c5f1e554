use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use profit_automation::AppState;
use profit_automation::config::{AutomationConfig, ENV_DATABASE_URL};

/// Run a single profit cycle and print the report as JSON.
///
/// Usage: cargo run --bin run_profit_cycle [--no-live-orders]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,profit_automation=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = AutomationConfig::from_env();
    if env::args().skip(1).any(|arg| arg == "--no-live-orders") {
        tracing::info!("Live order sync disabled, orders will be simulated");
        config.printful_api_key = None;
    }

    // Connect to database
    let database_url = env::var(ENV_DATABASE_URL).expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    migration::Migrator::up(&db, None).await?;

    let state = AppState::from_config(db, config);
    let report = state.cycle.run_cycle().await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        std::process::exit(1);
    }

    Ok(())
}
