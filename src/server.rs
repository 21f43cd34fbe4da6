//! HTTP server: REST routes over the game service, plus the chat WebSocket.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db::{NewHint, NewPuzzle, Puzzle};
use crate::service::{GameService, ServiceError, current_week};
use crate::ws;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: GameService,
}

impl AppState {
    /// Wraps a game service for router state.
    pub fn new(service: GameService) -> Self {
        Self { service }
    }

    /// The wrapped game service.
    pub fn service(&self) -> &GameService {
        &self.service
    }
}

/// Builds the application router: REST routes plus `/ws`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/moods", get(list_moods))
        .route("/users/{id}/achievements", get(list_achievements))
        .route("/users/{id}/guesses", get(list_guesses))
        .route("/puzzles", get(list_puzzles).post(create_puzzle))
        .route("/puzzles/{id}", get(get_puzzle))
        .route("/puzzles/{id}/hints", get(list_hints).post(create_hint))
        .route("/guesses", post(submit_guess))
        .route("/hints/reveal", post(reveal_hint))
        .route("/moods", post(record_mood))
        .route("/leaderboard", get(current_standings))
        .route("/leaderboard/{week}", get(standings_for_week))
        .route("/ws", get(ws::upgrade))
        .with_state(state)
}

/// Runs the server on the given address until shutdown.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
#[instrument(skip(state))]
pub async fn serve(state: AppState, host: String, port: u16) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(%host, port, "Server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// API error with an HTTP status and a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::UserNotFound(_) | ServiceError::PuzzleNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::PuzzleInactive(_) => StatusCode::CONFLICT,
            ServiceError::Db(db) if db.is_constraint_violation() => StatusCode::CONFLICT,
            ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!(error = %err, "Request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Puzzle as presented to clients: everything except the answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleView {
    id: i32,
    title: String,
    prompt: String,
    category: String,
    difficulty: i32,
    active: bool,
    created_at: NaiveDateTime,
}

impl From<Puzzle> for PuzzleView {
    fn from(p: Puzzle) -> Self {
        Self {
            id: *p.id(),
            title: p.title().clone(),
            prompt: p.prompt().clone(),
            category: p.category().clone(),
            difficulty: *p.difficulty(),
            active: *p.active(),
            created_at: *p.created_at(),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    display_name: String,
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.display_name.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "displayName must not be empty",
        ));
    }
    let user = state
        .service
        .get_or_create_user(req.display_name.trim().to_string())?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.service.users().list().map_err(ServiceError::from)?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .service
        .users()
        .get(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::UserNotFound(id))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePuzzleRequest {
    title: String,
    prompt: String,
    answer: String,
    category: String,
    #[serde(default = "default_difficulty")]
    difficulty: i32,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_difficulty() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

async fn create_puzzle(
    State(state): State<AppState>,
    Json(req): Json<CreatePuzzleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.answer.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "answer must not be empty",
        ));
    }
    let puzzle = state
        .service
        .puzzles()
        .create(NewPuzzle::new(
            req.title,
            req.prompt,
            req.answer,
            req.category,
            req.difficulty,
            req.active,
        ))
        .map_err(ServiceError::from)?;
    Ok((StatusCode::CREATED, Json(PuzzleView::from(puzzle))))
}

async fn list_puzzles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let puzzles = state.service.puzzles().list().map_err(ServiceError::from)?;
    let views: Vec<PuzzleView> = puzzles.into_iter().map(PuzzleView::from).collect();
    Ok(Json(views))
}

async fn get_puzzle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let puzzle = state
        .service
        .puzzles()
        .get(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::PuzzleNotFound(id))?;
    Ok(Json(PuzzleView::from(puzzle)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateHintRequest {
    ordinal: i32,
    text: String,
    #[serde(default = "default_hint_cost")]
    cost: i32,
}

fn default_hint_cost() -> i32 {
    1
}

async fn create_hint(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<CreateHintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .puzzles()
        .get(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::PuzzleNotFound(id))?;
    let hint = state
        .service
        .hints()
        .create(NewHint::new(id, req.ordinal, req.text, req.cost))
        .map_err(ServiceError::from)?;
    Ok((StatusCode::CREATED, Json(hint)))
}

async fn list_hints(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .puzzles()
        .get(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::PuzzleNotFound(id))?;
    let hints = state
        .service
        .hints()
        .list_for_puzzle(id)
        .map_err(ServiceError::from)?;
    Ok(Json(hints))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitGuessRequest {
    user_id: i32,
    puzzle_id: i32,
    text: String,
    #[serde(default)]
    hints_used: i32,
}

async fn submit_guess(
    State(state): State<AppState>,
    Json(req): Json<SubmitGuessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome =
        state
            .service
            .submit_guess(req.user_id, req.puzzle_id, &req.text, req.hints_used)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevealHintRequest {
    puzzle_id: i32,
    ordinal: i32,
}

async fn reveal_hint(
    State(state): State<AppState>,
    Json(req): Json<RevealHintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let hint = state.service.reveal_hint(req.puzzle_id, req.ordinal)?;
    match hint {
        Some(hint) => Ok(Json(json!({ "hint": hint }))),
        None => Ok(Json(json!({ "hint": null }))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordMoodRequest {
    user_id: i32,
    mood: String,
    #[serde(default)]
    note: Option<String>,
}

async fn record_mood(
    State(state): State<AppState>,
    Json(req): Json<RecordMoodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.service.record_mood(req.user_id, req.mood, req.note)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list_moods(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .users()
        .get(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::UserNotFound(id))?;
    let entries = state
        .service
        .moods()
        .history(id)
        .map_err(ServiceError::from)?;
    Ok(Json(entries))
}

async fn list_achievements(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let earned = state.service.earned_achievements(id)?;
    let body: Vec<serde_json::Value> = earned
        .into_iter()
        .map(|(achievement, award)| {
            json!({
                "code": achievement.code(),
                "name": achievement.name(),
                "description": achievement.description(),
                "points": achievement.points(),
                "earnedAt": award.earned_at(),
            })
        })
        .collect();
    Ok(Json(body))
}

async fn list_guesses(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .users()
        .get(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::UserNotFound(id))?;
    let guesses = state.service.guess_history(id)?;
    Ok(Json(guesses))
}

#[derive(Debug, Deserialize)]
struct StandingsQuery {
    week: Option<String>,
}

async fn current_standings(
    State(state): State<AppState>,
    Query(query): Query<StandingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let week = query.week.unwrap_or_else(current_week);
    standings_body(&state, &week)
}

async fn standings_for_week(
    State(state): State<AppState>,
    Path(week): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    standings_body(&state, &week)
}

fn standings_body(state: &AppState, week: &str) -> Result<Json<serde_json::Value>, ApiError> {
    let standings = state.service.weekly_standings(week)?;
    Ok(Json(json!({ "week": week, "entries": standings })))
}
