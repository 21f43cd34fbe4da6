//! Puzzlechat library - puzzle-game backend with a chat-style frontend
//!
//! # Architecture
//!
//! - **db**: provider selection, diesel schema, and models over SQLite
//! - **repo**: one thin repository per table cluster
//! - **service**: game rules (answer checking, weekly scoring, achievements)
//! - **server**: axum REST routes and shared state
//! - **ws**: chat-style WebSocket protocol
//! - **transfer**: whole-database JSON export/import
//! - **seed**: named seed profiles for development databases

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Module declarations
pub mod cli;
pub mod config;
pub mod db;
pub mod repo;
pub mod seed;
pub mod server;
pub mod service;
pub mod transfer;
pub mod ws;

// Crate-level exports - persistence
pub use db::{Database, DbError, Provider};

// Crate-level exports - repositories
pub use repo::{
    AchievementRepository, GuessRepository, HintRepository, LeaderboardRepository, MoodRepository,
    PuzzleRepository, UserRepository,
};

// Crate-level exports - game rules
pub use service::{GameService, GuessOutcome, ServiceError, current_week, week_key};

// Crate-level exports - server
pub use server::{AppState, router, serve};

// Crate-level exports - configuration
pub use config::{ConfigError, ServerConfig};
