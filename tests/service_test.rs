//! Tests for the game-rules service layer.

use tempfile::NamedTempFile;

use puzzlechat::db::{Database, NewHint, NewPuzzle};
use puzzlechat::service::current_week;
use puzzlechat::{GameService, ServiceError};

fn setup_service() -> (NamedTempFile, GameService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let db = Database::sqlite(db_path).expect("Failed to open database");
    db.run_migrations().expect("Migrations failed");

    let service = GameService::new(db);
    service.ensure_achievements().expect("Achievements failed");
    (db_file, service)
}

/// A difficulty-2 puzzle with two hints costing 2 and 3.
fn seed_puzzle(service: &GameService) -> i32 {
    let puzzle = service
        .puzzles()
        .create(NewPuzzle::new(
            "The Keeper".to_string(),
            "I stand by the sea and wink at ships.".to_string(),
            "Lighthouse".to_string(),
            "riddles".to_string(),
            2,
            true,
        ))
        .expect("Puzzle failed");
    service
        .hints()
        .create(NewHint::new(*puzzle.id(), 1, "It has a lamp.".to_string(), 2))
        .expect("Hint failed");
    service
        .hints()
        .create(NewHint::new(
            *puzzle.id(),
            2,
            "Sailors depend on it.".to_string(),
            3,
        ))
        .expect("Hint failed");
    *puzzle.id()
}

#[test]
fn test_get_or_create_user_is_stable() {
    let (_db_file, service) = setup_service();

    let first = service
        .get_or_create_user("ada".to_string())
        .expect("Create failed");
    let second = service
        .get_or_create_user("ada".to_string())
        .expect("Lookup failed");
    assert_eq!(first.id(), second.id());
}

#[test]
fn test_correct_guess_scores_and_credits_leaderboard() {
    let (_db_file, service) = setup_service();
    let puzzle_id = seed_puzzle(&service);
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    let outcome = service
        .submit_guess(*user.id(), puzzle_id, "lighthouse", 0)
        .expect("Guess failed");

    assert!(*outcome.correct());
    assert!(*outcome.solved());
    // difficulty 2 * 10 with no hint penalty.
    assert_eq!(*outcome.score(), 20);
    assert!(outcome
        .new_achievements()
        .contains(&"first-solve".to_string()));

    let standings = service
        .weekly_standings(&current_week())
        .expect("Standings failed");
    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].display_name(), "ada");
    assert_eq!(*standings[0].score(), 20);
    assert_eq!(*standings[0].puzzles_solved(), 1);
}

#[test]
fn test_guess_comparison_is_case_and_whitespace_insensitive() {
    let (_db_file, service) = setup_service();
    let puzzle_id = seed_puzzle(&service);
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    let outcome = service
        .submit_guess(*user.id(), puzzle_id, "  LIGHTHOUSE  ", 0)
        .expect("Guess failed");
    assert!(*outcome.correct());
}

#[test]
fn test_hint_costs_reduce_score() {
    let (_db_file, service) = setup_service();
    let puzzle_id = seed_puzzle(&service);
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    // One hint consumed: 20 - 2 = 18.
    let outcome = service
        .submit_guess(*user.id(), puzzle_id, "lighthouse", 1)
        .expect("Guess failed");
    assert_eq!(*outcome.score(), 18);
}

#[test]
fn test_solve_score_never_drops_below_one() {
    let (_db_file, service) = setup_service();
    let puzzle = service
        .puzzles()
        .create(NewPuzzle::new(
            "Cheap".to_string(),
            "Prompt".to_string(),
            "answer".to_string(),
            "riddles".to_string(),
            1,
            true,
        ))
        .expect("Puzzle failed");
    service
        .hints()
        .create(NewHint::new(*puzzle.id(), 1, "Big hint".to_string(), 99))
        .expect("Hint failed");
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    let outcome = service
        .submit_guess(*user.id(), *puzzle.id(), "answer", 1)
        .expect("Guess failed");
    assert_eq!(*outcome.score(), 1);
}

#[test]
fn test_wrong_guess_records_without_scoring() {
    let (_db_file, service) = setup_service();
    let puzzle_id = seed_puzzle(&service);
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    let outcome = service
        .submit_guess(*user.id(), puzzle_id, "windmill", 0)
        .expect("Guess failed");

    assert!(!outcome.correct());
    assert!(!outcome.solved());
    assert_eq!(*outcome.score(), 0);
    assert!(service
        .weekly_standings(&current_week())
        .expect("Standings failed")
        .is_empty());
    assert_eq!(service.guess_history(*user.id()).expect("History failed").len(), 1);
}

#[test]
fn test_repeat_solve_scores_nothing() {
    let (_db_file, service) = setup_service();
    let puzzle_id = seed_puzzle(&service);
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    service
        .submit_guess(*user.id(), puzzle_id, "lighthouse", 0)
        .expect("Guess failed");
    let repeat = service
        .submit_guess(*user.id(), puzzle_id, "lighthouse", 0)
        .expect("Guess failed");

    assert!(*repeat.correct());
    assert!(!repeat.solved());
    assert_eq!(*repeat.score(), 0);

    let standings = service
        .weekly_standings(&current_week())
        .expect("Standings failed");
    assert_eq!(*standings[0].score(), 20);
    assert_eq!(*standings[0].puzzles_solved(), 1);
}

#[test]
fn test_guess_against_inactive_puzzle_is_rejected() {
    let (_db_file, service) = setup_service();
    let puzzle = service
        .puzzles()
        .create(NewPuzzle::new(
            "Closed".to_string(),
            "Prompt".to_string(),
            "answer".to_string(),
            "riddles".to_string(),
            1,
            false,
        ))
        .expect("Puzzle failed");
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    let result = service.submit_guess(*user.id(), *puzzle.id(), "answer", 0);
    assert!(matches!(result, Err(ServiceError::PuzzleInactive(_))));
}

#[test]
fn test_guess_missing_user_or_puzzle() {
    let (_db_file, service) = setup_service();
    let puzzle_id = seed_puzzle(&service);
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    assert!(matches!(
        service.submit_guess(9999, puzzle_id, "x", 0),
        Err(ServiceError::UserNotFound(9999))
    ));
    assert!(matches!(
        service.submit_guess(*user.id(), 9999, "x", 0),
        Err(ServiceError::PuzzleNotFound(9999))
    ));
}

#[test]
fn test_reveal_hint_walks_ordinals() {
    let (_db_file, service) = setup_service();
    let puzzle_id = seed_puzzle(&service);

    let first = service
        .reveal_hint(puzzle_id, 1)
        .expect("Reveal failed")
        .expect("Hint missing");
    assert_eq!(first.text(), "It has a lamp.");

    let second = service
        .reveal_hint(puzzle_id, 2)
        .expect("Reveal failed")
        .expect("Hint missing");
    assert_eq!(second.text(), "Sailors depend on it.");

    assert!(service.reveal_hint(puzzle_id, 3).expect("Reveal failed").is_none());
}

#[test]
fn test_record_mood_awards_mood_tracker() {
    let (_db_file, service) = setup_service();
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    let entry = service
        .record_mood(*user.id(), "curious".to_string(), Some("fun".to_string()))
        .expect("Mood failed");
    assert_eq!(entry.mood(), "curious");

    let earned = service
        .earned_achievements(*user.id())
        .expect("Earned failed");
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].0.code(), "mood-tracker");

    // A second mood does not double-award.
    service
        .record_mood(*user.id(), "stuck".to_string(), None)
        .expect("Mood failed");
    assert_eq!(
        service
            .earned_achievements(*user.id())
            .expect("Earned failed")
            .len(),
        1
    );
}

#[test]
fn test_ten_solves_achievement() {
    let (_db_file, service) = setup_service();
    let user = service
        .get_or_create_user("ada".to_string())
        .expect("User failed");

    for i in 0..10 {
        let puzzle = service
            .puzzles()
            .create(NewPuzzle::new(
                format!("Puzzle {i}"),
                "Prompt".to_string(),
                format!("answer{i}"),
                "riddles".to_string(),
                1,
                true,
            ))
            .expect("Puzzle failed");
        let outcome = service
            .submit_guess(*user.id(), *puzzle.id(), &format!("answer{i}"), 0)
            .expect("Guess failed");

        if i < 9 {
            assert!(!outcome.new_achievements().contains(&"ten-solves".to_string()));
        } else {
            assert!(outcome.new_achievements().contains(&"ten-solves".to_string()));
        }
    }
}

#[test]
fn test_random_puzzle_only_picks_active() {
    let (_db_file, service) = setup_service();
    assert!(service.random_puzzle().expect("Random failed").is_none());

    service
        .puzzles()
        .create(NewPuzzle::new(
            "Closed".to_string(),
            "Prompt".to_string(),
            "answer".to_string(),
            "riddles".to_string(),
            1,
            false,
        ))
        .expect("Puzzle failed");
    assert!(service.random_puzzle().expect("Random failed").is_none());

    seed_puzzle(&service);
    let picked = service.random_puzzle().expect("Random failed");
    assert_eq!(picked.expect("Puzzle missing").title(), "The Keeper");
}
