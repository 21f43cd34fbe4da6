//! Database persistence layer: provider selection, schema, and models.

mod error;
mod models;
mod provider;
pub(crate) mod schema;

pub use error::DbError;
pub use models::{
    Achievement, GeneratedPuzzle, Guess, Hint, LeaderboardEntry, MoodEntry, NewAchievement,
    NewGeneratedPuzzle, NewGuess, NewHint, NewLeaderboardEntry, NewMoodEntry, NewPuzzle, NewUser,
    NewUserAchievement, Puzzle, Standing, User, UserAchievement,
};
pub use provider::{Database, MIGRATIONS, Provider};
