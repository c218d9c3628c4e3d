use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use skillquest_api::{build_router, AppState};
use skillquest_common::AppConfig;
use skillquest_store::PgStore;

#[derive(Parser)]
#[command(name = "skillquest-api", about = "SkillQuest employee quest progress API")]
struct Cli {
    /// Bind address (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides API_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Do not run database migrations on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    info!(
        max_connections = config.database_max_connections,
        "Connected to database"
    );

    if cli.skip_migrations {
        info!("Skipping migrations");
    } else {
        sqlx::migrate!("../../migrations").run(&pool).await?;
        info!("Migrations complete");
    }

    let store = Arc::new(PgStore::new(pool));
    let state = Arc::new(AppState::from_store(store, config.max_skills_for_employee));
    let app = build_router(state);

    let host = cli.host.unwrap_or(config.api_host);
    let port = cli.port.unwrap_or(config.api_port);
    let addr = format!("{host}:{port}");
    info!("SkillQuest API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
