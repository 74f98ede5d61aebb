//! edutrack-api - Task assignment service
//!
//! HTTP API for expert task creation with per-student fan-out, student
//! status transitions with submissions, grading, notifications, and
//! progress analytics.

use anyhow::Result;
use clap::Parser;
use edutrack_common::events::EventBus;
use edutrack_api::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "edutrack-api", version, about = "Edutrack task assignment service")]
struct Args {
    /// Data folder holding edutrack.db (overrides EDUTRACK_DATA_DIR and config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 5780)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting edutrack-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    // Resolve data folder: CLI > env > config file > OS default
    let data_dir =
        edutrack_common::config::resolve_data_dir(args.data_dir.as_deref(), "EDUTRACK_DATA_DIR")?;
    edutrack_common::config::ensure_data_dir(&data_dir)?;

    let db_path = edutrack_common::config::database_path(&data_dir);
    info!("Database path: {}", db_path.display());

    let pool = edutrack_common::db::init_database(&db_path).await?;
    info!("Database connection established");

    // Event bus for after-commit fan-out events
    let events = EventBus::new(100);

    // Create application state and router
    let state = AppState::new(pool, events);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("edutrack-api listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
