//! Repository for the `users` table.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{Database, DbError, NewUser, User, schema};

/// Repository for user account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    /// Creates a repository over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the display name is already taken or a database
    /// error occurs.
    #[instrument(skip(self))]
    pub fn create(&self, display_name: String) -> Result<User, DbError> {
        debug!(display_name = %display_name, "Creating user");
        let mut conn = self.db.connection()?;

        let new_user = NewUser::new(display_name);

        let user = diesel::insert_into(schema::users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), display_name = %user.display_name(), "User created");
        Ok(user)
    }

    /// Gets a user by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get(&self, user_id: i32) -> Result<Option<User>, DbError> {
        let mut conn = self.db.connection()?;

        let user = schema::users::table
            .find(user_id)
            .first::<User>(&mut conn)
            .optional()?;

        Ok(user)
    }

    /// Gets a user by display name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_by_name(&self, display_name: &str) -> Result<Option<User>, DbError> {
        debug!(display_name = %display_name, "Looking up user by name");
        let mut conn = self.db.connection()?;

        let user = schema::users::table
            .filter(schema::users::display_name.eq(display_name))
            .first::<User>(&mut conn)
            .optional()?;

        Ok(user)
    }

    /// Lists all user accounts, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<User>, DbError> {
        let mut conn = self.db.connection()?;

        let users = schema::users::table
            .order((schema::users::created_at.asc(), schema::users::id.asc()))
            .load::<User>(&mut conn)?;

        info!(count = users.len(), "Users loaded");
        Ok(users)
    }

    /// Deletes a user by id. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete(&self, user_id: i32) -> Result<usize, DbError> {
        let mut conn = self.db.connection()?;

        let removed =
            diesel::delete(schema::users::table.find(user_id)).execute(&mut conn)?;

        info!(user_id, removed, "User deleted");
        Ok(removed)
    }
}
