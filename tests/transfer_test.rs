//! Tests for JSON export/import.

use tempfile::{NamedTempFile, TempDir};

use puzzlechat::db::{Database, NewHint, NewPuzzle};
use puzzlechat::service::GameService;
use puzzlechat::transfer::{self, EXPORT_VERSION, TransferError};

fn setup_db() -> (NamedTempFile, Database) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let db = Database::sqlite(db_path).expect("Failed to open database");
    db.run_migrations().expect("Migrations failed");
    (db_file, db)
}

/// Populates a database with one of everything.
fn populate(db: &Database) {
    let service = GameService::new(db.clone());
    service.ensure_achievements().expect("Achievements failed");

    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");
    let puzzle = service
        .puzzles()
        .create(NewPuzzle::new(
            "Echo".to_string(),
            "I speak without a mouth.".to_string(),
            "echo".to_string(),
            "riddles".to_string(),
            2,
            true,
        ))
        .expect("Puzzle failed");
    service
        .hints()
        .create(NewHint::new(*puzzle.id(), 1, "You hear it.".to_string(), 1))
        .expect("Hint failed");
    service
        .submit_guess(*user.id(), *puzzle.id(), "echo", 0)
        .expect("Guess failed");
    service
        .record_mood(*user.id(), "triumphant".to_string(), None)
        .expect("Mood failed");
    service
        .puzzles()
        .create_draft(puzzlechat::db::NewGeneratedPuzzle::new(
            "Draft prompt".to_string(),
            "draft".to_string(),
            "riddles".to_string(),
            "generator-v1".to_string(),
        ))
        .expect("Draft failed");
}

#[test]
fn test_export_envelope() {
    let (_db_file, db) = setup_db();
    populate(&db);

    let export = transfer::export(&db).expect("Export failed");
    assert_eq!(export.version, EXPORT_VERSION);
    assert_eq!(export.provider, "sqlite");
    assert_eq!(export.data.users.len(), 1);
    assert_eq!(export.data.puzzles.len(), 1);
    assert_eq!(export.data.guesses.len(), 1);
    assert_eq!(export.data.hints.len(), 1);
    assert_eq!(export.data.weekly_leaderboards.len(), 1);
    assert_eq!(export.data.mood_history.len(), 1);
    assert_eq!(export.data.achievements.len(), 3);
    // first-solve and mood-tracker.
    assert_eq!(export.data.user_achievements.len(), 2);
    assert_eq!(export.data.generated_puzzles.len(), 1);
}

#[test]
fn test_export_import_round_trip_preserves_references() {
    let (_src_file, src) = setup_db();
    populate(&src);

    let dir = TempDir::new().expect("Temp dir failed");
    let path = dir.path().join("export.json");
    let exported = transfer::export_to_file(&src, &path).expect("Export failed");

    let (_dst_file, dst) = setup_db();
    let rows = transfer::import_from_file(&dst, &path).expect("Import failed");
    assert_eq!(rows, exported.data.row_count());

    // Imported rows keep their identifiers, so gameplay keeps working.
    let reread = transfer::export(&dst).expect("Re-export failed");
    let user_id = *reread.data.users[0].id();
    assert_eq!(reread.data.guesses[0].user_id(), &user_id);

    let service = GameService::new(dst.clone());
    let earned = service
        .earned_achievements(user_id)
        .expect("Earned failed");
    assert_eq!(earned.len(), 2);
}

#[test]
fn test_import_replaces_existing_rows() {
    let (_src_file, src) = setup_db();
    populate(&src);
    let export = transfer::export(&src).expect("Export failed");

    let (_dst_file, dst) = setup_db();
    let service = GameService::new(dst.clone());
    service
        .get_or_create_user("leftover".to_string())
        .expect("User failed");

    transfer::import(&dst, &export).expect("Import failed");

    let reread = transfer::export(&dst).expect("Re-export failed");
    assert_eq!(reread.data.users.len(), 1);
    assert_eq!(reread.data.users[0].display_name(), "ada");
}

#[test]
fn test_import_rejects_unsupported_version() {
    let (_src_file, src) = setup_db();
    populate(&src);
    let mut export = transfer::export(&src).expect("Export failed");
    export.version = 99;

    let (_dst_file, dst) = setup_db();
    let result = transfer::import(&dst, &export);
    assert!(matches!(
        result,
        Err(TransferError::UnsupportedVersion { found: 99 })
    ));
}

#[test]
fn test_import_rejects_malformed_file() {
    let (_db_file, db) = setup_db();

    let dir = TempDir::new().expect("Temp dir failed");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"version\": \"not a number\"}").expect("Write failed");

    let result = transfer::import_from_file(&db, &path);
    assert!(matches!(result, Err(TransferError::InvalidFormat(_))));
}

#[test]
fn test_import_missing_file_is_io_error() {
    let (_db_file, db) = setup_db();
    let result = transfer::import_from_file(&db, "/no/such/file.json");
    assert!(matches!(result, Err(TransferError::Io(_))));
}

#[test]
fn test_clear_empties_every_table() {
    let (_db_file, db) = setup_db();
    populate(&db);

    transfer::clear(&db).expect("Clear failed");

    let export = transfer::export(&db).expect("Export failed");
    assert_eq!(export.data.row_count(), 0);
}
