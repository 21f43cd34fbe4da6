//! Tests for the REST routes, driven through the router with oneshot
//! requests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use puzzlechat::db::Database;
use puzzlechat::{AppState, GameService, router};

fn setup_app() -> (NamedTempFile, Router) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let db = Database::sqlite(db_path).expect("Failed to open database");
    db.run_migrations().expect("Migrations failed");

    let service = GameService::new(db);
    service.ensure_achievements().expect("Achievements failed");
    (db_file, router(AppState::new(service)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Body read failed")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body was not JSON")
    };
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Request build failed")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Request build failed")
}

#[tokio::test]
async fn test_health() {
    let (_db_file, app) = setup_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_fetch_user() {
    let (_db_file, app) = setup_app();

    let (status, body) = send(&app, post("/users", json!({"displayName": "ada"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["displayName"], "ada");
    let id = body["id"].as_i64().expect("Missing id");

    let (status, body) = send(&app, get(&format!("/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["displayName"], "ada");

    let (status, body) = send(&app, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("Expected array").len(), 1);
}

#[tokio::test]
async fn test_create_user_rejects_blank_name() {
    let (_db_file, app) = setup_app();
    let (status, body) = send(&app, post("/users", json!({"displayName": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_missing_user_is_404() {
    let (_db_file, app) = setup_app();
    let (status, _body) = send(&app, get("/users/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_puzzle_listing_hides_answers() {
    let (_db_file, app) = setup_app();

    let (status, created) = send(
        &app,
        post(
            "/puzzles",
            json!({
                "title": "Echo",
                "prompt": "I speak without a mouth.",
                "answer": "echo",
                "category": "riddles",
                "difficulty": 2
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("answer").is_none());

    let (status, body) = send(&app, get("/puzzles")).await;
    assert_eq!(status, StatusCode::OK);
    let puzzles = body.as_array().expect("Expected array");
    assert_eq!(puzzles.len(), 1);
    assert!(puzzles[0].get("answer").is_none());
    assert_eq!(puzzles[0]["title"], "Echo");
}

#[tokio::test]
async fn test_guess_flow_scores_and_ranks() {
    let (_db_file, app) = setup_app();

    let (_, user) = send(&app, post("/users", json!({"displayName": "ada"}))).await;
    let (_, puzzle) = send(
        &app,
        post(
            "/puzzles",
            json!({
                "title": "Echo",
                "prompt": "I speak without a mouth.",
                "answer": "echo",
                "category": "riddles",
                "difficulty": 2
            }),
        ),
    )
    .await;

    let (status, outcome) = send(
        &app,
        post(
            "/guesses",
            json!({
                "userId": user["id"],
                "puzzleId": puzzle["id"],
                "text": "Echo"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["correct"], true);
    assert_eq!(outcome["solved"], true);
    assert_eq!(outcome["score"], 20);

    let (status, standings) = send(&app, get("/leaderboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(standings["entries"][0]["displayName"], "ada");
    assert_eq!(standings["entries"][0]["score"], 20);

    let (status, earned) = send(
        &app,
        get(&format!("/users/{}/achievements", user["id"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(earned[0]["code"], "first-solve");
}

#[tokio::test]
async fn test_guess_against_missing_puzzle_is_404() {
    let (_db_file, app) = setup_app();
    let (_, user) = send(&app, post("/users", json!({"displayName": "ada"}))).await;

    let (status, _body) = send(
        &app,
        post(
            "/guesses",
            json!({"userId": user["id"], "puzzleId": 999, "text": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hint_routes() {
    let (_db_file, app) = setup_app();
    let (_, puzzle) = send(
        &app,
        post(
            "/puzzles",
            json!({
                "title": "Echo",
                "prompt": "I speak without a mouth.",
                "answer": "echo",
                "category": "riddles"
            }),
        ),
    )
    .await;
    let puzzle_id = puzzle["id"].as_i64().expect("Missing id");

    let (status, _hint) = send(
        &app,
        post(
            &format!("/puzzles/{puzzle_id}/hints"),
            json!({"ordinal": 1, "text": "You hear it.", "cost": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, hints) = send(&app, get(&format!("/puzzles/{puzzle_id}/hints"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hints.as_array().expect("Expected array").len(), 1);

    let (status, revealed) = send(
        &app,
        post("/hints/reveal", json!({"puzzleId": puzzle_id, "ordinal": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revealed["hint"]["text"], "You hear it.");

    let (status, exhausted) = send(
        &app,
        post("/hints/reveal", json!({"puzzleId": puzzle_id, "ordinal": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(exhausted["hint"].is_null());
}

#[tokio::test]
async fn test_mood_routes() {
    let (_db_file, app) = setup_app();
    let (_, user) = send(&app, post("/users", json!({"displayName": "ada"}))).await;

    let (status, entry) = send(
        &app,
        post(
            "/moods",
            json!({"userId": user["id"], "mood": "curious", "note": "fun"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["mood"], "curious");

    let (status, history) = send(
        &app,
        get(&format!("/users/{}/moods", user["id"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().expect("Expected array").len(), 1);
}

#[tokio::test]
async fn test_standings_for_named_week() {
    let (_db_file, app) = setup_app();
    let (status, body) = send(&app, get("/leaderboard/2026-W01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week"], "2026-W01");
    assert!(body["entries"].as_array().expect("Expected array").is_empty());
}
