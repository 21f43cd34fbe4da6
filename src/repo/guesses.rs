//! Repository for the `guesses` table.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{Database, DbError, Guess, NewGuess, schema};

/// Repository for guess records.
#[derive(Debug, Clone)]
pub struct GuessRepository {
    db: Database,
}

impl GuessRepository {
    /// Creates a repository over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Records a guess.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the referenced user or puzzle does not exist or
    /// a database error occurs.
    #[instrument(skip(self, guess), fields(user_id = guess.user_id(), puzzle_id = guess.puzzle_id()))]
    pub fn record(&self, guess: NewGuess) -> Result<Guess, DbError> {
        let mut conn = self.db.connection()?;

        let guess = diesel::insert_into(schema::guesses::table)
            .values(&guess)
            .returning(Guess::as_returning())
            .get_result(&mut conn)?;

        info!(
            guess_id = guess.id(),
            user_id = guess.user_id(),
            puzzle_id = guess.puzzle_id(),
            correct = guess.correct(),
            "Guess recorded"
        );
        Ok(guess)
    }

    /// Lists a user's guesses, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_for_user(&self, user_id: i32) -> Result<Vec<Guess>, DbError> {
        let mut conn = self.db.connection()?;

        let guesses = schema::guesses::table
            .filter(schema::guesses::user_id.eq(user_id))
            .order(schema::guesses::submitted_at.desc())
            .load::<Guess>(&mut conn)?;

        debug!(user_id, count = guesses.len(), "User guesses loaded");
        Ok(guesses)
    }

    /// Lists the guesses made against a puzzle, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_for_puzzle(&self, puzzle_id: i32) -> Result<Vec<Guess>, DbError> {
        let mut conn = self.db.connection()?;

        let guesses = schema::guesses::table
            .filter(schema::guesses::puzzle_id.eq(puzzle_id))
            .order(schema::guesses::submitted_at.desc())
            .load::<Guess>(&mut conn)?;

        Ok(guesses)
    }

    /// True when the user already has a correct guess on the puzzle.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn has_solved(&self, user_id: i32, puzzle_id: i32) -> Result<bool, DbError> {
        let mut conn = self.db.connection()?;

        let count: i64 = schema::guesses::table
            .filter(schema::guesses::user_id.eq(user_id))
            .filter(schema::guesses::puzzle_id.eq(puzzle_id))
            .filter(schema::guesses::correct.eq(true))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }

    /// Number of distinct puzzles the user has solved.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn solved_puzzle_count(&self, user_id: i32) -> Result<i64, DbError> {
        let mut conn = self.db.connection()?;

        let puzzle_ids: Vec<i32> = schema::guesses::table
            .filter(schema::guesses::user_id.eq(user_id))
            .filter(schema::guesses::correct.eq(true))
            .select(schema::guesses::puzzle_id)
            .distinct()
            .load(&mut conn)?;

        Ok(puzzle_ids.len() as i64)
    }
}
