//! Puzzlechat - unified CLI
//!
//! Puzzle-game backend server and database tooling.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use puzzlechat::cli::{Cli, Command, DbArgs};
use puzzlechat::db::Database;
use puzzlechat::seed::{self, SeedProfile};
use puzzlechat::server::{AppState, serve};
use puzzlechat::service::GameService;
use puzzlechat::transfer;
use puzzlechat::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port, db } => run_serve(host, port, db).await,
        Command::Seed { profile, file, db } => run_seed(profile, file.as_deref(), db),
        Command::Import { file, db } => run_import(&file, db),
        Command::Export { file, db } => run_export(&file, db),
        Command::Migrate { db } => run_migrate(db),
    }
}

/// Resolves configuration from file, environment, and CLI flags.
fn load_config(db: &DbArgs) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(db.config.as_deref())?;
    if let Some(db_path) = &db.db_path {
        config.set_db_path(db_path.clone());
    }
    Ok(config)
}

/// Opens the configured database through the provider factory.
fn open_database(config: &ServerConfig) -> Result<Database> {
    let db = Database::open(*config.provider(), config.db_path())?;
    Ok(db)
}

async fn run_serve(host: Option<String>, port: Option<u16>, db: DbArgs) -> Result<()> {
    let mut config = load_config(&db)?;
    if let Some(host) = host {
        config.set_host(host);
    }
    if let Some(port) = port {
        config.set_port(port);
    }

    let database = open_database(&config)?;
    database.run_migrations()?;

    let service = GameService::new(database);
    service.ensure_achievements()?;

    info!(
        provider = %config.provider(),
        db_path = %config.db_path(),
        "Starting puzzlechat server"
    );
    serve(
        AppState::new(service),
        config.host().clone(),
        *config.port(),
    )
    .await?;
    Ok(())
}

fn run_seed(profile: SeedProfile, file: Option<&Path>, db: DbArgs) -> Result<()> {
    let config = load_config(&db)?;
    let database = open_database(&config)?;

    seed::seed(&database, profile, file)?;
    info!(profile = %profile, "Seed complete");
    Ok(())
}

fn run_import(file: &Path, db: DbArgs) -> Result<()> {
    let config = load_config(&db)?;
    let database = open_database(&config)?;
    database.run_migrations()?;

    let rows = transfer::import_from_file(&database, file)?;
    info!(rows, file = %file.display(), "Import complete");
    Ok(())
}

fn run_export(file: &Path, db: DbArgs) -> Result<()> {
    let config = load_config(&db)?;
    let database = open_database(&config)?;
    database.run_migrations()?;

    let export = transfer::export_to_file(&database, file)?;
    info!(
        rows = export.data.row_count(),
        file = %file.display(),
        provider = %export.provider,
        "Export complete"
    );
    Ok(())
}

fn run_migrate(db: DbArgs) -> Result<()> {
    let config = load_config(&db)?;
    let database = open_database(&config)?;
    database.run_migrations()?;
    info!(db_path = %config.db_path(), "Migrations up to date");
    Ok(())
}
