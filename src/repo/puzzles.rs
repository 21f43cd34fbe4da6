//! Repository for the `puzzles` and `generated_puzzles` tables.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{
    Database, DbError, GeneratedPuzzle, NewGeneratedPuzzle, NewPuzzle, Puzzle, schema,
};

/// Repository for puzzle records and machine-generated drafts.
#[derive(Debug, Clone)]
pub struct PuzzleRepository {
    db: Database,
}

impl PuzzleRepository {
    /// Creates a repository over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates a new puzzle.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, puzzle), fields(title = %puzzle.title(), category = %puzzle.category()))]
    pub fn create(&self, puzzle: NewPuzzle) -> Result<Puzzle, DbError> {
        let mut conn = self.db.connection()?;

        let puzzle = diesel::insert_into(schema::puzzles::table)
            .values(&puzzle)
            .returning(Puzzle::as_returning())
            .get_result(&mut conn)?;

        info!(puzzle_id = puzzle.id(), title = %puzzle.title(), "Puzzle created");
        Ok(puzzle)
    }

    /// Gets a puzzle by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get(&self, puzzle_id: i32) -> Result<Option<Puzzle>, DbError> {
        let mut conn = self.db.connection()?;

        let puzzle = schema::puzzles::table
            .find(puzzle_id)
            .first::<Puzzle>(&mut conn)
            .optional()?;

        Ok(puzzle)
    }

    /// Lists all puzzles, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Puzzle>, DbError> {
        let mut conn = self.db.connection()?;

        let puzzles = schema::puzzles::table
            .order(schema::puzzles::created_at.desc())
            .load::<Puzzle>(&mut conn)?;

        Ok(puzzles)
    }

    /// Lists puzzles currently open for guessing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_active(&self) -> Result<Vec<Puzzle>, DbError> {
        let mut conn = self.db.connection()?;

        let puzzles = schema::puzzles::table
            .filter(schema::puzzles::active.eq(true))
            .order(schema::puzzles::created_at.desc())
            .load::<Puzzle>(&mut conn)?;

        debug!(count = puzzles.len(), "Active puzzles loaded");
        Ok(puzzles)
    }

    /// Lists puzzles in a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_by_category(&self, category: &str) -> Result<Vec<Puzzle>, DbError> {
        let mut conn = self.db.connection()?;

        let puzzles = schema::puzzles::table
            .filter(schema::puzzles::category.eq(category))
            .order(schema::puzzles::created_at.desc())
            .load::<Puzzle>(&mut conn)?;

        Ok(puzzles)
    }

    /// Deletes a puzzle by id. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete(&self, puzzle_id: i32) -> Result<usize, DbError> {
        let mut conn = self.db.connection()?;

        let removed =
            diesel::delete(schema::puzzles::table.find(puzzle_id)).execute(&mut conn)?;

        info!(puzzle_id, removed, "Puzzle deleted");
        Ok(removed)
    }

    /// Stores a machine-generated puzzle draft.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, draft), fields(source = %draft.source()))]
    pub fn create_draft(&self, draft: NewGeneratedPuzzle) -> Result<GeneratedPuzzle, DbError> {
        let mut conn = self.db.connection()?;

        let draft = diesel::insert_into(schema::generated_puzzles::table)
            .values(&draft)
            .returning(GeneratedPuzzle::as_returning())
            .get_result(&mut conn)?;

        info!(draft_id = draft.id(), "Generated puzzle draft stored");
        Ok(draft)
    }

    /// Lists drafts that have not yet been promoted into real puzzles.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_pending_drafts(&self) -> Result<Vec<GeneratedPuzzle>, DbError> {
        let mut conn = self.db.connection()?;

        let drafts = schema::generated_puzzles::table
            .filter(schema::generated_puzzles::promoted.eq(false))
            .order(schema::generated_puzzles::created_at.asc())
            .load::<GeneratedPuzzle>(&mut conn)?;

        Ok(drafts)
    }

    /// Promotes a draft into the `puzzles` table and marks it promoted.
    ///
    /// The draft's prompt doubles as the puzzle title until an editor renames
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the draft does not exist, was already promoted,
    /// or a database error occurs.
    #[instrument(skip(self))]
    pub fn promote_draft(&self, draft_id: i32, difficulty: i32) -> Result<Puzzle, DbError> {
        let mut conn = self.db.connection()?;

        let draft = schema::generated_puzzles::table
            .find(draft_id)
            .first::<GeneratedPuzzle>(&mut conn)
            .optional()?
            .ok_or_else(|| DbError::new(format!("Draft {draft_id} not found")))?;

        if *draft.promoted() {
            return Err(DbError::new(format!("Draft {draft_id} already promoted")));
        }

        let new_puzzle = NewPuzzle::new(
            draft.prompt().clone(),
            draft.prompt().clone(),
            draft.answer().clone(),
            draft.category().clone(),
            difficulty,
            true,
        );

        let puzzle = diesel::insert_into(schema::puzzles::table)
            .values(&new_puzzle)
            .returning(Puzzle::as_returning())
            .get_result(&mut conn)?;

        diesel::update(schema::generated_puzzles::table.find(draft_id))
            .set(schema::generated_puzzles::promoted.eq(true))
            .execute(&mut conn)?;

        info!(draft_id, puzzle_id = puzzle.id(), "Draft promoted to puzzle");
        Ok(puzzle)
    }
}
