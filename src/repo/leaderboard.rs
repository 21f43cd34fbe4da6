//! Repository for the `weekly_leaderboards` table.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{Database, DbError, LeaderboardEntry, NewLeaderboardEntry, Standing, schema};

/// Repository for weekly leaderboard entries.
#[derive(Debug, Clone)]
pub struct LeaderboardRepository {
    db: Database,
}

impl LeaderboardRepository {
    /// Creates a repository over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Gets the entry for a user and week, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_entry(&self, user_id: i32, week: &str) -> Result<Option<LeaderboardEntry>, DbError> {
        let mut conn = self.db.connection()?;

        let entry = schema::weekly_leaderboards::table
            .filter(schema::weekly_leaderboards::user_id.eq(user_id))
            .filter(schema::weekly_leaderboards::week.eq(week))
            .first::<LeaderboardEntry>(&mut conn)
            .optional()?;

        Ok(entry)
    }

    /// Adds score and solve credit to a user's entry for the week, creating
    /// the row on first credit.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn credit(
        &self,
        user_id: i32,
        week: &str,
        score_delta: i32,
        solved_delta: i32,
    ) -> Result<LeaderboardEntry, DbError> {
        debug!(user_id, week, score_delta, solved_delta, "Crediting leaderboard");
        let mut conn = self.db.connection()?;

        let existing = schema::weekly_leaderboards::table
            .filter(schema::weekly_leaderboards::user_id.eq(user_id))
            .filter(schema::weekly_leaderboards::week.eq(week))
            .first::<LeaderboardEntry>(&mut conn)
            .optional()?;

        let entry = match existing {
            Some(entry) => diesel::update(schema::weekly_leaderboards::table.find(entry.id()))
                .set((
                    schema::weekly_leaderboards::score
                        .eq(schema::weekly_leaderboards::score + score_delta),
                    schema::weekly_leaderboards::puzzles_solved
                        .eq(schema::weekly_leaderboards::puzzles_solved + solved_delta),
                    schema::weekly_leaderboards::updated_at.eq(diesel::dsl::now),
                ))
                .returning(LeaderboardEntry::as_returning())
                .get_result(&mut conn)?,
            None => diesel::insert_into(schema::weekly_leaderboards::table)
                .values(&NewLeaderboardEntry::new(
                    user_id,
                    week.to_string(),
                    score_delta,
                    solved_delta,
                ))
                .returning(LeaderboardEntry::as_returning())
                .get_result(&mut conn)?,
        };

        info!(
            user_id,
            week,
            score = entry.score(),
            puzzles_solved = entry.puzzles_solved(),
            "Leaderboard credited"
        );
        Ok(entry)
    }

    /// Weekly standings: entries joined to user names, highest score first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn standings(&self, week: &str) -> Result<Vec<Standing>, DbError> {
        let mut conn = self.db.connection()?;

        let standings = schema::weekly_leaderboards::table
            .inner_join(schema::users::table)
            .filter(schema::weekly_leaderboards::week.eq(week))
            .order(schema::weekly_leaderboards::score.desc())
            .select((
                schema::users::display_name,
                schema::weekly_leaderboards::score,
                schema::weekly_leaderboards::puzzles_solved,
            ))
            .load::<Standing>(&mut conn)?;

        debug!(week, count = standings.len(), "Standings loaded");
        Ok(standings)
    }

    /// Lists the distinct weeks that have leaderboard entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn weeks(&self) -> Result<Vec<String>, DbError> {
        let mut conn = self.db.connection()?;

        let weeks = schema::weekly_leaderboards::table
            .select(schema::weekly_leaderboards::week)
            .distinct()
            .order(schema::weekly_leaderboards::week.desc())
            .load::<String>(&mut conn)?;

        Ok(weeks)
    }
}
