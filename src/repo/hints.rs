//! Repository for the `hints` table.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{Database, DbError, Hint, NewHint, schema};

/// Repository for puzzle hints.
#[derive(Debug, Clone)]
pub struct HintRepository {
    db: Database,
}

impl HintRepository {
    /// Creates a repository over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates a hint for a puzzle.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the (puzzle, ordinal) pair already exists or a
    /// database error occurs.
    #[instrument(skip(self, hint), fields(puzzle_id = hint.puzzle_id(), ordinal = hint.ordinal()))]
    pub fn create(&self, hint: NewHint) -> Result<Hint, DbError> {
        let mut conn = self.db.connection()?;

        let hint = diesel::insert_into(schema::hints::table)
            .values(&hint)
            .returning(Hint::as_returning())
            .get_result(&mut conn)?;

        info!(hint_id = hint.id(), puzzle_id = hint.puzzle_id(), "Hint created");
        Ok(hint)
    }

    /// Lists a puzzle's hints in reveal order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_for_puzzle(&self, puzzle_id: i32) -> Result<Vec<Hint>, DbError> {
        let mut conn = self.db.connection()?;

        let hints = schema::hints::table
            .filter(schema::hints::puzzle_id.eq(puzzle_id))
            .order(schema::hints::ordinal.asc())
            .load::<Hint>(&mut conn)?;

        debug!(puzzle_id, count = hints.len(), "Hints loaded");
        Ok(hints)
    }

    /// Gets the hint with the given reveal ordinal, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_by_ordinal(&self, puzzle_id: i32, ordinal: i32) -> Result<Option<Hint>, DbError> {
        let mut conn = self.db.connection()?;

        let hint = schema::hints::table
            .filter(schema::hints::puzzle_id.eq(puzzle_id))
            .filter(schema::hints::ordinal.eq(ordinal))
            .first::<Hint>(&mut conn)
            .optional()?;

        Ok(hint)
    }

    /// Deletes all hints for a puzzle. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_for_puzzle(&self, puzzle_id: i32) -> Result<usize, DbError> {
        let mut conn = self.db.connection()?;

        let removed = diesel::delete(
            schema::hints::table.filter(schema::hints::puzzle_id.eq(puzzle_id)),
        )
        .execute(&mut conn)?;

        info!(puzzle_id, removed, "Hints deleted");
        Ok(removed)
    }
}
