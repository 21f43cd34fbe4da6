//! Whole-database JSON export and import.
//!
//! The export file carries a format version, the export timestamp, the
//! provider it came from, and one array per table under `data`. Import
//! validates the envelope, clears the database, and restores rows with their
//! original identifiers so references stay intact.

use std::path::Path;

use chrono::{DateTime, Utc};
use derive_more::{Display, Error, From};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::db::{
    Achievement, Database, DbError, GeneratedPuzzle, Guess, Hint, LeaderboardEntry, MoodEntry,
    Puzzle, User, UserAchievement, schema,
};

/// Current export format version.
pub const EXPORT_VERSION: u32 = 1;

/// Errors from export/import operations.
#[derive(Debug, Display, Error, From)]
pub enum TransferError {
    /// File could not be read or written.
    #[display("File error: {_0}")]
    Io(std::io::Error),
    /// The file is not a valid export document.
    #[display("Invalid export format: {_0}")]
    InvalidFormat(serde_json::Error),
    /// The file's format version is not supported.
    #[display("Unsupported export version {found}; expected {EXPORT_VERSION}")]
    #[from(ignore)]
    UnsupportedVersion {
        /// Version declared by the file.
        #[error(not(source))]
        found: u32,
    },
    /// Underlying database failure.
    Db(DbError),
}

/// Export document envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    /// Format version, currently 1.
    pub version: u32,
    /// When the export was taken.
    pub exported_at: DateTime<Utc>,
    /// Provider the data came from.
    pub provider: String,
    /// One array per table.
    pub data: ExportData,
}

/// Whole-table snapshots, one array per table.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// All user accounts.
    #[serde(default)]
    pub users: Vec<User>,
    /// All puzzles.
    #[serde(default)]
    pub puzzles: Vec<Puzzle>,
    /// All guesses.
    #[serde(default)]
    pub guesses: Vec<Guess>,
    /// All hints.
    #[serde(default)]
    pub hints: Vec<Hint>,
    /// All weekly leaderboard entries.
    #[serde(default)]
    pub weekly_leaderboards: Vec<LeaderboardEntry>,
    /// All mood history rows.
    #[serde(default)]
    pub mood_history: Vec<MoodEntry>,
    /// All achievement definitions.
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// All achievement awards.
    #[serde(default)]
    pub user_achievements: Vec<UserAchievement>,
    /// All generated puzzle drafts.
    #[serde(default)]
    pub generated_puzzles: Vec<GeneratedPuzzle>,
}

impl ExportData {
    /// Total row count across every table.
    pub fn row_count(&self) -> usize {
        self.users.len()
            + self.puzzles.len()
            + self.guesses.len()
            + self.hints.len()
            + self.weekly_leaderboards.len()
            + self.mood_history.len()
            + self.achievements.len()
            + self.user_achievements.len()
            + self.generated_puzzles.len()
    }
}

/// Serializes every table into an export document.
///
/// # Errors
///
/// Returns [`TransferError`] if a query fails.
#[instrument(skip(db))]
pub fn export(db: &Database) -> Result<ExportFile, TransferError> {
    let mut conn = db.connection().map_err(TransferError::Db)?;

    let data = ExportData {
        users: schema::users::table.load(&mut conn).map_err(DbError::from)?,
        puzzles: schema::puzzles::table
            .load(&mut conn)
            .map_err(DbError::from)?,
        guesses: schema::guesses::table
            .load(&mut conn)
            .map_err(DbError::from)?,
        hints: schema::hints::table.load(&mut conn).map_err(DbError::from)?,
        weekly_leaderboards: schema::weekly_leaderboards::table
            .load(&mut conn)
            .map_err(DbError::from)?,
        mood_history: schema::mood_history::table
            .load(&mut conn)
            .map_err(DbError::from)?,
        achievements: schema::achievements::table
            .load(&mut conn)
            .map_err(DbError::from)?,
        user_achievements: schema::user_achievements::table
            .load(&mut conn)
            .map_err(DbError::from)?,
        generated_puzzles: schema::generated_puzzles::table
            .load(&mut conn)
            .map_err(DbError::from)?,
    };

    info!(rows = data.row_count(), "Export assembled");
    Ok(ExportFile {
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        provider: db.provider().to_string(),
        data,
    })
}

/// Exports the database to a pretty-printed JSON file.
///
/// # Errors
///
/// Returns [`TransferError`] if the export or the write fails.
#[instrument(skip(db, path), fields(path = %path.as_ref().display()))]
pub fn export_to_file(db: &Database, path: impl AsRef<Path>) -> Result<ExportFile, TransferError> {
    let export = export(db)?;
    let body = serde_json::to_string_pretty(&export)?;
    std::fs::write(path.as_ref(), body)?;
    info!(path = %path.as_ref().display(), rows = export.data.row_count(), "Export written");
    Ok(export)
}

/// Replaces the database contents with the rows from an export document.
///
/// Rows keep their original identifiers. Referenced tables (users, puzzles,
/// achievements) are inserted before the tables that point at them.
///
/// # Errors
///
/// Returns [`TransferError`] if the version is unsupported or a query fails.
#[instrument(skip(db, export), fields(rows = export.data.row_count()))]
pub fn import(db: &Database, export: &ExportFile) -> Result<usize, TransferError> {
    if export.version != EXPORT_VERSION {
        return Err(TransferError::UnsupportedVersion {
            found: export.version,
        });
    }

    clear(db).map_err(TransferError::Db)?;
    let mut conn = db.connection().map_err(TransferError::Db)?;

    diesel::insert_into(schema::users::table)
        .values(&export.data.users)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::puzzles::table)
        .values(&export.data.puzzles)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::achievements::table)
        .values(&export.data.achievements)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::guesses::table)
        .values(&export.data.guesses)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::hints::table)
        .values(&export.data.hints)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::weekly_leaderboards::table)
        .values(&export.data.weekly_leaderboards)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::mood_history::table)
        .values(&export.data.mood_history)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::user_achievements::table)
        .values(&export.data.user_achievements)
        .execute(&mut conn)
        .map_err(DbError::from)?;
    diesel::insert_into(schema::generated_puzzles::table)
        .values(&export.data.generated_puzzles)
        .execute(&mut conn)
        .map_err(DbError::from)?;

    let rows = export.data.row_count();
    info!(rows, "Import complete");
    Ok(rows)
}

/// Imports an export-format JSON file.
///
/// # Errors
///
/// Returns [`TransferError`] if the file cannot be read, is not a valid
/// export document, or a query fails.
#[instrument(skip(db, path), fields(path = %path.as_ref().display()))]
pub fn import_from_file(db: &Database, path: impl AsRef<Path>) -> Result<usize, TransferError> {
    let body = std::fs::read_to_string(path.as_ref())?;
    let export: ExportFile = serde_json::from_str(&body)?;
    import(db, &export)
}

/// Deletes every row from every table, child tables first.
///
/// # Errors
///
/// Returns [`DbError`] if a delete fails.
#[instrument(skip(db))]
pub fn clear(db: &Database) -> Result<(), DbError> {
    let mut conn = db.connection()?;

    diesel::delete(schema::user_achievements::table).execute(&mut conn)?;
    diesel::delete(schema::guesses::table).execute(&mut conn)?;
    diesel::delete(schema::hints::table).execute(&mut conn)?;
    diesel::delete(schema::weekly_leaderboards::table).execute(&mut conn)?;
    diesel::delete(schema::mood_history::table).execute(&mut conn)?;
    diesel::delete(schema::generated_puzzles::table).execute(&mut conn)?;
    diesel::delete(schema::achievements::table).execute(&mut conn)?;
    diesel::delete(schema::puzzles::table).execute(&mut conn)?;
    diesel::delete(schema::users::table).execute(&mut conn)?;

    info!("Database cleared");
    Ok(())
}
