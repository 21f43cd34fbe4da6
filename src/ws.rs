//! Chat-style WebSocket frontend.
//!
//! One JSON text frame per message, tagged with a `type` field. A client
//! opens with `hello` to bind a user account, then guesses, asks for hints,
//! records moods, and reads standings over the same connection. Hint reveal
//! progress is per-connection state, mirroring the client-side tracking of
//! the original chat UI.

use std::collections::HashMap;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::server::{AppState, PuzzleView};
use crate::service::{GameService, GuessOutcome, ServiceError, current_week};

/// Messages a client may send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Bind (or create) the user account for this connection.
    Hello {
        /// Display name to sign in with.
        name: String,
    },
    /// Ask for a random active puzzle.
    Puzzle,
    /// Submit a guess.
    Guess {
        /// Puzzle being guessed at.
        puzzle_id: i32,
        /// The guess text.
        text: String,
    },
    /// Reveal the next hint for a puzzle.
    Hint {
        /// Puzzle to get a hint for.
        puzzle_id: i32,
    },
    /// Record a mood entry.
    Mood {
        /// Mood label.
        mood: String,
        /// Optional free-text note.
        #[serde(default)]
        note: Option<String>,
    },
    /// Ask for weekly standings.
    Standings {
        /// Week key; current week when omitted.
        #[serde(default)]
        week: Option<String>,
    },
}

/// Messages the server sends back.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sign-in succeeded.
    Welcome {
        /// Bound user id.
        user_id: i32,
        /// Bound display name.
        display_name: String,
    },
    /// A puzzle to chew on.
    Puzzle {
        /// The puzzle, without its answer.
        puzzle: PuzzleView,
    },
    /// No active puzzles exist.
    NoPuzzles,
    /// Result of a guess.
    GuessResult {
        /// Scoring outcome.
        outcome: GuessOutcome,
    },
    /// The next hint.
    Hint {
        /// Puzzle the hint belongs to.
        puzzle_id: i32,
        /// Reveal position.
        ordinal: i32,
        /// Hint text.
        text: String,
        /// Score cost of having seen this hint.
        cost: i32,
    },
    /// Every hint for the puzzle has been revealed.
    NoMoreHints {
        /// Puzzle that ran out of hints.
        puzzle_id: i32,
    },
    /// Mood entry stored.
    MoodRecorded {
        /// Stored entry id.
        entry_id: i32,
    },
    /// Weekly standings.
    Standings {
        /// Week the standings cover.
        week: String,
        /// Entries, highest score first.
        entries: Vec<crate::db::Standing>,
    },
    /// Something went wrong; the connection stays open.
    Error {
        /// Human-readable message.
        message: String,
    },
}

/// Upgrades `GET /ws` to a chat session.
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let service = state.service().clone();
    ws.on_upgrade(move |socket| run_session(service, socket))
}

/// Per-connection chat state.
struct ChatSession {
    service: GameService,
    user_id: Option<i32>,
    /// Hints revealed on this connection, keyed by puzzle id.
    hints_revealed: HashMap<i32, i32>,
}

#[instrument(skip(service, socket))]
async fn run_session(service: GameService, mut socket: WebSocket) {
    info!("Chat session opened");
    let mut session = ChatSession {
        service,
        user_id: None,
        hints_revealed: HashMap::new(),
    };

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                warn!(error = %error, "WebSocket receive failed; closing session");
                break;
            }
        };

        let reply = match message {
            Message::Text(text) => session.handle_text(text.as_str()),
            Message::Close(_) => {
                debug!("Client closed the session");
                break;
            }
            // Pings are answered by the protocol layer; binary frames are
            // not part of the chat protocol.
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => continue,
        };

        let body = match serde_json::to_string(&reply) {
            Ok(body) => body,
            Err(error) => {
                warn!(error = %error, "Failed to serialize reply");
                continue;
            }
        };

        if let Err(error) = socket.send(Message::Text(body.into())).await {
            warn!(error = %error, "WebSocket send failed; closing session");
            break;
        }
    }

    info!("Chat session closed");
}

impl ChatSession {
    /// Parses and dispatches one inbound text frame.
    fn handle_text(&mut self, text: &str) -> ServerMessage {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(error) => {
                debug!(error = %error, "Malformed chat frame");
                return ServerMessage::Error {
                    message: format!("Malformed message: {error}"),
                };
            }
        };

        match self.dispatch(message) {
            Ok(reply) => reply,
            Err(error) => ServerMessage::Error {
                message: error.to_string(),
            },
        }
    }

    fn dispatch(&mut self, message: ClientMessage) -> Result<ServerMessage, ServiceError> {
        match message {
            ClientMessage::Hello { name } => self.hello(name),
            ClientMessage::Puzzle => self.puzzle(),
            ClientMessage::Guess { puzzle_id, text } => self.guess(puzzle_id, &text),
            ClientMessage::Hint { puzzle_id } => self.hint(puzzle_id),
            ClientMessage::Mood { mood, note } => self.mood(mood, note),
            ClientMessage::Standings { week } => self.standings(week),
        }
    }

    fn hello(&mut self, name: String) -> Result<ServerMessage, ServiceError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(ServerMessage::Error {
                message: "Name must not be empty".to_string(),
            });
        }

        let user = self.service.get_or_create_user(trimmed.to_string())?;
        self.user_id = Some(*user.id());
        info!(user_id = user.id(), "Chat user signed in");
        Ok(ServerMessage::Welcome {
            user_id: *user.id(),
            display_name: user.display_name().clone(),
        })
    }

    fn puzzle(&self) -> Result<ServerMessage, ServiceError> {
        if self.user_id.is_none() {
            return Ok(ServerMessage::Error {
                message: "Say hello first".to_string(),
            });
        }

        match self.service.random_puzzle()? {
            Some(puzzle) => Ok(ServerMessage::Puzzle {
                puzzle: PuzzleView::from(puzzle),
            }),
            None => Ok(ServerMessage::NoPuzzles),
        }
    }

    fn guess(&mut self, puzzle_id: i32, text: &str) -> Result<ServerMessage, ServiceError> {
        let user_id = match self.user_id {
            Some(user_id) => user_id,
            None => {
                return Ok(ServerMessage::Error {
                    message: "Say hello first".to_string(),
                });
            }
        };

        let hints_used = self.hints_revealed.get(&puzzle_id).copied().unwrap_or(0);
        let outcome = self
            .service
            .submit_guess(user_id, puzzle_id, text, hints_used)?;
        Ok(ServerMessage::GuessResult { outcome })
    }

    fn hint(&mut self, puzzle_id: i32) -> Result<ServerMessage, ServiceError> {
        if self.user_id.is_none() {
            return Ok(ServerMessage::Error {
                message: "Say hello first".to_string(),
            });
        }

        let next = self.hints_revealed.get(&puzzle_id).copied().unwrap_or(0) + 1;
        match self.service.reveal_hint(puzzle_id, next)? {
            Some(hint) => {
                self.hints_revealed.insert(puzzle_id, next);
                Ok(ServerMessage::Hint {
                    puzzle_id,
                    ordinal: *hint.ordinal(),
                    text: hint.text().clone(),
                    cost: *hint.cost(),
                })
            }
            None => Ok(ServerMessage::NoMoreHints { puzzle_id }),
        }
    }

    fn mood(&self, mood: String, note: Option<String>) -> Result<ServerMessage, ServiceError> {
        let user_id = match self.user_id {
            Some(user_id) => user_id,
            None => {
                return Ok(ServerMessage::Error {
                    message: "Say hello first".to_string(),
                });
            }
        };

        let entry = self.service.record_mood(user_id, mood, note)?;
        Ok(ServerMessage::MoodRecorded {
            entry_id: *entry.id(),
        })
    }

    fn standings(&self, week: Option<String>) -> Result<ServerMessage, ServiceError> {
        if self.user_id.is_none() {
            return Ok(ServerMessage::Error {
                message: "Say hello first".to_string(),
            });
        }

        let week = week.unwrap_or_else(current_week);
        let entries = self.service.weekly_standings(&week)?;
        Ok(ServerMessage::Standings { week, entries })
    }
}
