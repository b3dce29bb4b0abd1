//! CLI for running schema migrations
//!
//! Thin wrapper over the embedded sqlx migrator; outputs JSON so
//! deployment tooling can parse the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Schema migration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Run,

    /// List applied migrations
    Status,
}

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<Vec<AppliedMigration>>,
}

#[derive(Serialize)]
struct AppliedMigration {
    version: i64,
    description: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let response = match cli.command {
        Commands::Run => run_migrations(&pool).await?,
        Commands::Status => migration_status(&pool).await?,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_migrations(pool: &PgPool) -> Result<Response> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    Ok(Response {
        success: true,
        message: Some("migrations applied".to_string()),
        applied: None,
    })
}

async fn migration_status(pool: &PgPool) -> Result<Response> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT version, description FROM _sqlx_migrations ORDER BY version")
            .fetch_all(pool)
            .await
            .context("Failed to read migration table (has `run` been executed?)")?;

    let applied = rows
        .into_iter()
        .map(|(version, description)| AppliedMigration {
            version,
            description,
        })
        .collect();

    Ok(Response {
        success: true,
        message: None,
        applied: Some(applied),
    })
}
