//! Database models and domain types.
//!
//! Each table gets a full-row model (queryable, and insertable so JSON
//! imports can restore rows with their original identifiers) plus a `New*`
//! insertable that leaves generated columns to the database.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// User account database model.
#[derive(
    Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Getters, Serialize, Deserialize,
)]
#[diesel(table_name = schema::users)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: i32,
    display_name: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Insertable user model for creating new accounts.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    display_name: String,
}

/// Puzzle database model.
#[derive(
    Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Getters, Serialize, Deserialize,
)]
#[diesel(table_name = schema::puzzles)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    id: i32,
    title: String,
    prompt: String,
    answer: String,
    category: String,
    difficulty: i32,
    active: bool,
    created_at: NaiveDateTime,
}

/// Insertable puzzle model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::puzzles)]
pub struct NewPuzzle {
    title: String,
    prompt: String,
    answer: String,
    category: String,
    difficulty: i32,
    active: bool,
}

/// Guess database model.
#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    Getters,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::guesses)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Puzzle))]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    id: i32,
    user_id: i32,
    puzzle_id: i32,
    guess_text: String,
    correct: bool,
    submitted_at: NaiveDateTime,
}

/// Insertable guess model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::guesses)]
pub struct NewGuess {
    user_id: i32,
    puzzle_id: i32,
    guess_text: String,
    correct: bool,
}

/// Hint database model. Ordinal is the 1-based reveal order within a puzzle.
#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    Getters,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::hints)]
#[diesel(belongs_to(Puzzle))]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    id: i32,
    puzzle_id: i32,
    ordinal: i32,
    text: String,
    cost: i32,
    created_at: NaiveDateTime,
}

/// Insertable hint model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::hints)]
pub struct NewHint {
    puzzle_id: i32,
    ordinal: i32,
    text: String,
    cost: i32,
}

/// Weekly leaderboard entry. The week column is an ISO week key such as
/// `2026-W35`; one row per user per week.
#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    Getters,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::weekly_leaderboards)]
#[diesel(belongs_to(User))]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    id: i32,
    user_id: i32,
    week: String,
    score: i32,
    puzzles_solved: i32,
    updated_at: NaiveDateTime,
}

/// Insertable leaderboard entry.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::weekly_leaderboards)]
pub struct NewLeaderboardEntry {
    user_id: i32,
    week: String,
    score: i32,
    puzzles_solved: i32,
}

/// Mood history database model.
#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    Getters,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::mood_history)]
#[diesel(belongs_to(User))]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    id: i32,
    user_id: i32,
    mood: String,
    note: Option<String>,
    recorded_at: NaiveDateTime,
}

/// Insertable mood entry.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::mood_history)]
pub struct NewMoodEntry {
    user_id: i32,
    mood: String,
    note: Option<String>,
}

/// Achievement definition database model.
#[derive(
    Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Getters, Serialize, Deserialize,
)]
#[diesel(table_name = schema::achievements)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    id: i32,
    code: String,
    name: String,
    description: String,
    points: i32,
}

/// Insertable achievement definition.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::achievements)]
pub struct NewAchievement {
    code: String,
    name: String,
    description: String,
    points: i32,
}

/// Link row recording that a user earned an achievement.
#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    Getters,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::user_achievements)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Achievement))]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    id: i32,
    user_id: i32,
    achievement_id: i32,
    earned_at: NaiveDateTime,
}

/// Insertable user-achievement link.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::user_achievements)]
pub struct NewUserAchievement {
    user_id: i32,
    achievement_id: i32,
}

/// Machine-generated puzzle draft awaiting review.
#[derive(
    Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Getters, Serialize, Deserialize,
)]
#[diesel(table_name = schema::generated_puzzles)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPuzzle {
    id: i32,
    prompt: String,
    answer: String,
    category: String,
    source: String,
    promoted: bool,
    created_at: NaiveDateTime,
}

/// Insertable generated puzzle draft.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::generated_puzzles)]
pub struct NewGeneratedPuzzle {
    prompt: String,
    answer: String,
    category: String,
    source: String,
}

/// One row of the weekly standings: a leaderboard entry joined to its user.
#[derive(Debug, Clone, Queryable, Getters, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    display_name: String,
    score: i32,
    puzzles_solved: i32,
}
