//! Repository for the `achievements` and `user_achievements` tables.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{
    Achievement, Database, DbError, NewAchievement, NewUserAchievement, UserAchievement, schema,
};

/// Repository for achievement definitions and awards.
#[derive(Debug, Clone)]
pub struct AchievementRepository {
    db: Database,
}

impl AchievementRepository {
    /// Creates a repository over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Defines an achievement. Existing definitions with the same code are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, achievement), fields(code = %achievement.code()))]
    pub fn define(&self, achievement: NewAchievement) -> Result<Achievement, DbError> {
        let mut conn = self.db.connection()?;

        let code = achievement.code().clone();
        diesel::insert_or_ignore_into(schema::achievements::table)
            .values(&achievement)
            .execute(&mut conn)?;

        let achievement = schema::achievements::table
            .filter(schema::achievements::code.eq(&code))
            .first::<Achievement>(&mut conn)?;

        debug!(achievement_id = achievement.id(), code = %code, "Achievement defined");
        Ok(achievement)
    }

    /// Lists all achievement definitions.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Achievement>, DbError> {
        let mut conn = self.db.connection()?;

        let achievements = schema::achievements::table
            .order(schema::achievements::code.asc())
            .load::<Achievement>(&mut conn)?;

        Ok(achievements)
    }

    /// Gets an achievement by its code. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_by_code(&self, code: &str) -> Result<Option<Achievement>, DbError> {
        let mut conn = self.db.connection()?;

        let achievement = schema::achievements::table
            .filter(schema::achievements::code.eq(code))
            .first::<Achievement>(&mut conn)
            .optional()?;

        Ok(achievement)
    }

    /// Awards an achievement to a user. Awarding twice is a no-op; returns
    /// `true` when the award was newly granted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the user or achievement does not exist or a
    /// database error occurs.
    #[instrument(skip(self))]
    pub fn award(&self, user_id: i32, achievement_id: i32) -> Result<bool, DbError> {
        let mut conn = self.db.connection()?;

        let inserted = diesel::insert_or_ignore_into(schema::user_achievements::table)
            .values(&NewUserAchievement::new(user_id, achievement_id))
            .execute(&mut conn)?;

        if inserted > 0 {
            info!(user_id, achievement_id, "Achievement awarded");
        }
        Ok(inserted > 0)
    }

    /// Lists the achievements a user has earned, with their award records.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn earned_by(&self, user_id: i32) -> Result<Vec<(Achievement, UserAchievement)>, DbError> {
        let mut conn = self.db.connection()?;

        let earned = schema::user_achievements::table
            .inner_join(schema::achievements::table)
            .filter(schema::user_achievements::user_id.eq(user_id))
            .order(schema::user_achievements::earned_at.asc())
            .select((Achievement::as_select(), UserAchievement::as_select()))
            .load::<(Achievement, UserAchievement)>(&mut conn)?;

        debug!(user_id, count = earned.len(), "Earned achievements loaded");
        Ok(earned)
    }
}
