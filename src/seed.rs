//! Seed profiles for development and testing databases.

use std::path::Path;

use clap::ValueEnum;
use derive_more::{Display, Error, From};
use strum::Display as StrumDisplay;
use tracing::{info, instrument};

use crate::db::{Database, DbError, NewGeneratedPuzzle, NewHint, NewPuzzle};
use crate::service::{GameService, ServiceError};
use crate::transfer::{self, TransferError};

/// Available seed profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum SeedProfile {
    /// One user and a couple of puzzles; the smallest useful database.
    Minimal,
    /// A handful of users with guesses, moods, and leaderboard history.
    Realistic,
    /// Bulk rows for load testing.
    Stress,
    /// Delete every row from every table.
    Clear,
    /// Seed from an export-format JSON file (requires `--file`).
    Custom,
}

/// Errors from seeding.
#[derive(Debug, Display, Error, From)]
pub enum SeedError {
    /// The `custom` profile needs a file argument.
    #[display("The custom profile requires --file <path>")]
    MissingFile,
    /// Underlying database failure.
    Db(DbError),
    /// Game-rule failure while seeding gameplay data.
    Service(ServiceError),
    /// Import failure for the custom profile.
    Transfer(TransferError),
}

/// Applies a seed profile to the database. Migrations run first.
///
/// # Errors
///
/// Returns [`SeedError`] if migrations, queries, or the custom-file import
/// fail.
#[instrument(skip(db, file), fields(profile = %profile))]
pub fn seed(db: &Database, profile: SeedProfile, file: Option<&Path>) -> Result<(), SeedError> {
    db.run_migrations()?;

    match profile {
        SeedProfile::Minimal => seed_minimal(db),
        SeedProfile::Realistic => seed_realistic(db),
        SeedProfile::Stress => seed_stress(db),
        SeedProfile::Clear => {
            transfer::clear(db)?;
            Ok(())
        }
        SeedProfile::Custom => {
            let file = file.ok_or(SeedError::MissingFile)?;
            let rows = transfer::import_from_file(db, file)?;
            info!(rows, "Custom seed imported");
            Ok(())
        }
    }
}

fn seed_minimal(db: &Database) -> Result<(), SeedError> {
    let service = GameService::new(db.clone());
    service.ensure_achievements()?;

    service.get_or_create_user("demo".to_string())?;

    let riddle = service.puzzles().create(NewPuzzle::new(
        "The Keeper".to_string(),
        "I stand by the sea and wink at ships all night. What am I?".to_string(),
        "lighthouse".to_string(),
        "riddles".to_string(),
        2,
        true,
    ))?;
    service
        .hints()
        .create(NewHint::new(*riddle.id(), 1, "It has a lamp.".to_string(), 2))?;
    service.hints().create(NewHint::new(
        *riddle.id(),
        2,
        "Sailors depend on it.".to_string(),
        3,
    ))?;

    service.puzzles().create(NewPuzzle::new(
        "Odd One Out".to_string(),
        "Which word does not belong: glove, scarf, anchor, mitten?".to_string(),
        "anchor".to_string(),
        "wordplay".to_string(),
        1,
        true,
    ))?;

    info!("Minimal seed complete: 1 user, 2 puzzles, 2 hints");
    Ok(())
}

fn seed_realistic(db: &Database) -> Result<(), SeedError> {
    seed_minimal(db)?;
    let service = GameService::new(db.clone());

    let puzzles = [
        ("Echo", "I speak without a mouth and hear without ears. What am I?", "echo", "riddles", 2),
        ("Footsteps", "The more you take, the more you leave behind. What are they?", "footsteps", "riddles", 3),
        ("Seven", "What has seven letters, is spelled with three, and everyone uses it?", "few", "wordplay", 4),
        ("Map Towns", "I have cities but no houses, forests but no trees. What am I?", "map", "riddles", 1),
    ];
    let mut created = Vec::new();
    for (title, prompt, answer, category, difficulty) in puzzles {
        let puzzle = service.puzzles().create(NewPuzzle::new(
            title.to_string(),
            prompt.to_string(),
            answer.to_string(),
            category.to_string(),
            difficulty,
            true,
        ))?;
        service.hints().create(NewHint::new(
            *puzzle.id(),
            1,
            format!("It starts with '{}'.", &answer[..1]),
            2,
        ))?;
        created.push(puzzle);
    }

    let moods = ["curious", "stuck", "triumphant"];
    for (i, name) in ["ada", "grace", "edsger", "barbara"].into_iter().enumerate() {
        let user = service.get_or_create_user(name.to_string())?;

        // Everyone solves a different prefix of the list, with a wrong
        // guess first so the history looks lived-in.
        for puzzle in created.iter().take(i + 1) {
            service.submit_guess(*user.id(), *puzzle.id(), "wrong answer", 0)?;
            service.submit_guess(*user.id(), *puzzle.id(), puzzle.answer(), 0)?;
        }

        service.record_mood(
            *user.id(),
            moods[i % moods.len()].to_string(),
            (i % 2 == 0).then(|| "seeded note".to_string()),
        )?;
    }

    service.puzzles().create_draft(NewGeneratedPuzzle::new(
        "I get wetter the more I dry. What am I?".to_string(),
        "towel".to_string(),
        "riddles".to_string(),
        "generator-v1".to_string(),
    ))?;

    info!("Realistic seed complete");
    Ok(())
}

fn seed_stress(db: &Database) -> Result<(), SeedError> {
    let service = GameService::new(db.clone());
    service.ensure_achievements()?;

    const USERS: usize = 200;
    const PUZZLES: usize = 50;

    let mut puzzle_ids = Vec::with_capacity(PUZZLES);
    for i in 0..PUZZLES {
        let puzzle = service.puzzles().create(NewPuzzle::new(
            format!("Stress Puzzle {i}"),
            format!("Stress prompt {i}"),
            format!("answer{i}"),
            "stress".to_string(),
            (i % 5) as i32 + 1,
            true,
        ))?;
        puzzle_ids.push((*puzzle.id(), format!("answer{i}")));
    }

    for i in 0..USERS {
        let user = service.get_or_create_user(format!("stress_user_{i}"))?;
        // Each user solves a handful of puzzles spread across the set.
        for j in 0..5 {
            let (puzzle_id, answer) = &puzzle_ids[(i * 5 + j) % PUZZLES];
            service.submit_guess(*user.id(), *puzzle_id, answer, 0)?;
        }
    }

    info!(users = USERS, puzzles = PUZZLES, "Stress seed complete");
    Ok(())
}
