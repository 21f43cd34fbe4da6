//! Command-line interface for puzzlechat.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::seed::SeedProfile;

/// Puzzlechat - puzzle-game backend with a chat-style WebSocket frontend
#[derive(Parser, Debug)]
#[command(name = "puzzlechat")]
#[command(about = "Puzzle-game backend server and database tooling", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Database and configuration flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct DbArgs {
    /// Path to the database file (overrides config and environment)
    #[arg(long)]
    pub db_path: Option<String>,

    /// Path to a TOML config file (defaults to puzzlechat.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP and WebSocket server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Seed the database with a named profile
    Seed {
        /// Profile to apply
        #[arg(value_enum)]
        profile: SeedProfile,

        /// Export-format JSON file for the custom profile
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Import an export-format JSON file, replacing the database contents
    Import {
        /// File to import
        file: PathBuf,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Export the database to a JSON file
    Export {
        /// File to write
        file: PathBuf,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Apply pending migrations and exit
    Migrate {
        #[command(flatten)]
        db: DbArgs,
    },
}
