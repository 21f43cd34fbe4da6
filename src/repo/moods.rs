//! Repository for the `mood_history` table.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{Database, DbError, MoodEntry, NewMoodEntry, schema};

/// Repository for mood history records.
#[derive(Debug, Clone)]
pub struct MoodRepository {
    db: Database,
}

impl MoodRepository {
    /// Creates a repository over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Records a mood entry for a user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the referenced user does not exist or a
    /// database error occurs.
    #[instrument(skip(self, entry), fields(user_id = entry.user_id(), mood = %entry.mood()))]
    pub fn record(&self, entry: NewMoodEntry) -> Result<MoodEntry, DbError> {
        let mut conn = self.db.connection()?;

        let entry = diesel::insert_into(schema::mood_history::table)
            .values(&entry)
            .returning(MoodEntry::as_returning())
            .get_result(&mut conn)?;

        info!(entry_id = entry.id(), user_id = entry.user_id(), "Mood recorded");
        Ok(entry)
    }

    /// Lists a user's mood history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn history(&self, user_id: i32) -> Result<Vec<MoodEntry>, DbError> {
        let mut conn = self.db.connection()?;

        let entries = schema::mood_history::table
            .filter(schema::mood_history::user_id.eq(user_id))
            .order(schema::mood_history::recorded_at.desc())
            .load::<MoodEntry>(&mut conn)?;

        debug!(user_id, count = entries.len(), "Mood history loaded");
        Ok(entries)
    }

    /// Deletes a user's mood history. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_for_user(&self, user_id: i32) -> Result<usize, DbError> {
        let mut conn = self.db.connection()?;

        let removed = diesel::delete(
            schema::mood_history::table.filter(schema::mood_history::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        info!(user_id, removed, "Mood history deleted");
        Ok(removed)
    }
}
