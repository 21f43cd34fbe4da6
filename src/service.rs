//! Game rules layered over the repositories.
//!
//! Repositories stay thin query wrappers; everything that counts as a rule
//! (answer checking, scoring, achievement awards, week bucketing) lives here.

use chrono::{Datelike, NaiveDate, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::db::{
    Achievement, Database, DbError, Guess, Hint, MoodEntry, NewAchievement, NewGuess, NewMoodEntry,
    Puzzle, Standing, User, UserAchievement,
};
use crate::repo::{
    AchievementRepository, GuessRepository, HintRepository, LeaderboardRepository, MoodRepository,
    PuzzleRepository, UserRepository,
};

/// Base score per difficulty point for a first solve.
const SCORE_PER_DIFFICULTY: i32 = 10;
/// A correct first solve never scores below this, however many hints it took.
const MIN_SOLVE_SCORE: i32 = 1;

/// Built-in achievement definitions, ensured lazily before awarding.
const ACHIEVEMENTS: &[(&str, &str, &str, i32)] = &[
    (
        "first-solve",
        "First Solve",
        "Solved a puzzle for the first time",
        10,
    ),
    (
        "ten-solves",
        "Puzzle Veteran",
        "Solved ten different puzzles",
        50,
    ),
    (
        "mood-tracker",
        "Mood Tracker",
        "Recorded a mood for the first time",
        5,
    ),
];

/// Errors surfaced by game operations.
#[derive(Debug, Clone, Display, Error, From)]
pub enum ServiceError {
    /// No user with the requested id.
    #[display("User {_0} not found")]
    #[from(ignore)]
    UserNotFound(#[error(not(source))] i32),
    /// No puzzle with the requested id.
    #[display("Puzzle {_0} not found")]
    #[from(ignore)]
    PuzzleNotFound(#[error(not(source))] i32),
    /// The puzzle is closed for guessing.
    #[display("Puzzle {_0} is not active")]
    #[from(ignore)]
    PuzzleInactive(#[error(not(source))] i32),
    /// Underlying database failure.
    Db(DbError),
}

/// Result of a guess submission.
#[derive(Debug, Clone, Getters, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessOutcome {
    guess_id: i32,
    correct: bool,
    /// True when this guess solved the puzzle for the first time.
    solved: bool,
    /// Score credited to the weekly leaderboard (zero unless `solved`).
    score: i32,
    /// Achievement codes newly earned by this guess.
    new_achievements: Vec<String>,
}

/// Service layer for puzzle gameplay.
///
/// Wraps the repositories with answer checking, weekly scoring, and
/// achievement awards.
#[derive(Debug, Clone)]
pub struct GameService {
    users: UserRepository,
    puzzles: PuzzleRepository,
    guesses: GuessRepository,
    hints: HintRepository,
    leaderboard: LeaderboardRepository,
    moods: MoodRepository,
    achievements: AchievementRepository,
}

impl GameService {
    /// Creates a service over the given database handle.
    #[instrument(skip(db))]
    pub fn new(db: Database) -> Self {
        info!("Creating GameService");
        Self {
            users: UserRepository::new(db.clone()),
            puzzles: PuzzleRepository::new(db.clone()),
            guesses: GuessRepository::new(db.clone()),
            hints: HintRepository::new(db.clone()),
            leaderboard: LeaderboardRepository::new(db.clone()),
            moods: MoodRepository::new(db.clone()),
            achievements: AchievementRepository::new(db),
        }
    }

    /// User repository.
    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// Puzzle repository.
    pub fn puzzles(&self) -> &PuzzleRepository {
        &self.puzzles
    }

    /// Guess repository.
    pub fn guesses(&self) -> &GuessRepository {
        &self.guesses
    }

    /// Hint repository.
    pub fn hints(&self) -> &HintRepository {
        &self.hints
    }

    /// Leaderboard repository.
    pub fn leaderboard(&self) -> &LeaderboardRepository {
        &self.leaderboard
    }

    /// Mood repository.
    pub fn moods(&self) -> &MoodRepository {
        &self.moods
    }

    /// Achievement repository.
    pub fn achievements(&self) -> &AchievementRepository {
        &self.achievements
    }

    /// Returns an existing user by name or creates one if not found.
    #[instrument(skip(self))]
    pub fn get_or_create_user(&self, display_name: String) -> Result<User, ServiceError> {
        debug!(display_name = %display_name, "Getting or creating user");

        if let Some(user) = self.users.get_by_name(&display_name)? {
            info!(user_id = user.id(), "Existing user found");
            return Ok(user);
        }

        info!(display_name = %display_name, "Creating new user");
        Ok(self.users.create(display_name)?)
    }

    /// Submits a guess against a puzzle.
    ///
    /// The guess is normalized (trimmed, case-insensitive) before comparison.
    /// A correct guess on a puzzle the user has not solved before credits the
    /// weekly leaderboard with `difficulty * 10` minus the cost of the
    /// `hints_used` hints consumed (never below 1), increments the weekly
    /// solve count, and checks achievements. Repeat correct guesses record
    /// but score nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the user or puzzle is missing, the puzzle
    /// is inactive, or a database error occurs.
    #[instrument(skip(self, guess_text), fields(guess_len = guess_text.len()))]
    pub fn submit_guess(
        &self,
        user_id: i32,
        puzzle_id: i32,
        guess_text: &str,
        hints_used: i32,
    ) -> Result<GuessOutcome, ServiceError> {
        let user = self
            .users
            .get(user_id)?
            .ok_or(ServiceError::UserNotFound(user_id))?;
        let puzzle = self
            .puzzles
            .get(puzzle_id)?
            .ok_or(ServiceError::PuzzleNotFound(puzzle_id))?;

        if !puzzle.active() {
            return Err(ServiceError::PuzzleInactive(puzzle_id));
        }

        let correct = normalize(guess_text) == normalize(puzzle.answer());
        let already_solved = self.guesses.has_solved(user_id, puzzle_id)?;

        let guess = self.guesses.record(NewGuess::new(
            user_id,
            puzzle_id,
            guess_text.trim().to_string(),
            correct,
        ))?;

        let solved = correct && !already_solved;
        let mut score = 0;
        let mut new_achievements = Vec::new();

        if solved {
            score = self.solve_score(&puzzle, hints_used)?;
            let week = current_week();
            self.leaderboard.credit(user_id, &week, score, 1)?;

            if self.maybe_award(user_id, "first-solve")? {
                new_achievements.push("first-solve".to_string());
            }
            if self.guesses.solved_puzzle_count(user_id)? >= 10
                && self.maybe_award(user_id, "ten-solves")?
            {
                new_achievements.push("ten-solves".to_string());
            }
        }

        info!(
            user_id = user.id(),
            puzzle_id,
            correct,
            solved,
            score,
            "Guess submitted"
        );

        Ok(GuessOutcome {
            guess_id: *guess.id(),
            correct,
            solved,
            score,
            new_achievements,
        })
    }

    /// Returns the hint at the given 1-based reveal position, or `None` when
    /// the puzzle has no more hints.
    ///
    /// Reveal progress is tracked by the caller (the chat session or client),
    /// not in the database.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the puzzle is missing or a database error
    /// occurs.
    #[instrument(skip(self))]
    pub fn reveal_hint(&self, puzzle_id: i32, ordinal: i32) -> Result<Option<Hint>, ServiceError> {
        self.puzzles
            .get(puzzle_id)?
            .ok_or(ServiceError::PuzzleNotFound(puzzle_id))?;

        Ok(self.hints.get_by_ordinal(puzzle_id, ordinal)?)
    }

    /// Records a mood entry for a user and checks the mood achievement.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the user is missing or a database error
    /// occurs.
    #[instrument(skip(self, note))]
    pub fn record_mood(
        &self,
        user_id: i32,
        mood: String,
        note: Option<String>,
    ) -> Result<MoodEntry, ServiceError> {
        self.users
            .get(user_id)?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let entry = self.moods.record(NewMoodEntry::new(user_id, mood, note))?;
        self.maybe_award(user_id, "mood-tracker")?;
        Ok(entry)
    }

    /// Weekly standings for the given week key, highest score first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn weekly_standings(&self, week: &str) -> Result<Vec<Standing>, ServiceError> {
        Ok(self.leaderboard.standings(week)?)
    }

    /// Achievements the given user has earned.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the user is missing or a database error
    /// occurs.
    #[instrument(skip(self))]
    pub fn earned_achievements(
        &self,
        user_id: i32,
    ) -> Result<Vec<(Achievement, UserAchievement)>, ServiceError> {
        self.users
            .get(user_id)?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        Ok(self.achievements.earned_by(user_id)?)
    }

    /// A user's guess history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn guess_history(&self, user_id: i32) -> Result<Vec<Guess>, ServiceError> {
        Ok(self.guesses.list_for_user(user_id)?)
    }

    /// Picks a random active puzzle, or `None` when the table is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn random_puzzle(&self) -> Result<Option<Puzzle>, ServiceError> {
        let active = self.puzzles.list_active()?;
        if active.is_empty() {
            return Ok(None);
        }
        let index = rand::rng().random_range(0..active.len());
        Ok(active.into_iter().nth(index))
    }

    /// Makes sure the built-in achievement definitions exist.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn ensure_achievements(&self) -> Result<(), ServiceError> {
        for (code, name, description, points) in ACHIEVEMENTS {
            self.achievements.define(NewAchievement::new(
                (*code).to_string(),
                (*name).to_string(),
                (*description).to_string(),
                *points,
            ))?;
        }
        Ok(())
    }

    /// Score for a first solve: difficulty-based, reduced by hint costs.
    fn solve_score(&self, puzzle: &Puzzle, hints_used: i32) -> Result<i32, ServiceError> {
        let base = puzzle.difficulty() * SCORE_PER_DIFFICULTY;
        let penalty: i32 = self
            .hints
            .list_for_puzzle(*puzzle.id())?
            .iter()
            .filter(|h| *h.ordinal() <= hints_used)
            .map(|h| *h.cost())
            .sum();
        Ok((base - penalty).max(MIN_SOLVE_SCORE))
    }

    /// Awards the achievement with the given code if the user does not have
    /// it yet. Returns `true` on a new award.
    fn maybe_award(&self, user_id: i32, code: &str) -> Result<bool, ServiceError> {
        self.ensure_achievements()?;
        let achievement = self
            .achievements
            .get_by_code(code)?
            .ok_or_else(|| DbError::new(format!("Achievement '{code}' not defined")))?;
        Ok(self.achievements.award(user_id, *achievement.id())?)
    }
}

/// Canonical form used for answer comparison.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// ISO week key (`2026-W35`) for the current date.
pub fn current_week() -> String {
    week_key(Utc::now().date_naive())
}

/// ISO week key for an arbitrary date.
pub fn week_key(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{:04}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_key_formats_iso_weeks() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(week_key(date), "2026-W35");
    }

    #[test]
    fn week_key_handles_year_boundary() {
        // 2027-01-01 falls in ISO week 53 of 2026.
        let date = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert_eq!(week_key(date), "2026-W53");
    }

    #[test]
    fn normalize_ignores_case_and_whitespace() {
        assert_eq!(normalize("  Lighthouse "), normalize("lighthouse"));
    }
}
