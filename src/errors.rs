use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::models::game::MatchError;

// Custom Errors used in handlers
#[derive(Debug, PartialEq)]
pub enum CustomError {
    BadRequest,
    EmptyName,
    MissingShips,
    MissingCoordinates,
    GameNotFound,
    PlayerNotFound,
    DuplicatePlayer,
    ShipsLocked,
    GameNotStarted,
    GameOver,
    NotYourTurn,
    NoOpponent,
    RepeatShot,
    InternalServerError,
}

// Map the game errors onto the errors the handlers report
impl From<MatchError> for CustomError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::EmptyName => Self::EmptyName,
            MatchError::MissingShips => Self::MissingShips,
            MatchError::MatchNotFound => Self::GameNotFound,
            MatchError::PlayerNotFound => Self::PlayerNotFound,
            MatchError::DuplicatePlayer => Self::DuplicatePlayer,
            // the registry moves the player to a new game, so this never reaches a handler
            MatchError::MatchFull => Self::InternalServerError,
            MatchError::ShipsLocked => Self::ShipsLocked,
            MatchError::GameNotStarted => Self::GameNotStarted,
            MatchError::GameOver => Self::GameOver,
            MatchError::NotYourTurn => Self::NotYourTurn,
            MatchError::NoOpponent => Self::NoOpponent,
            MatchError::RepeatShot => Self::RepeatShot,
        }
    }
}

impl CustomError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::GameNotFound | Self::PlayerNotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    // Shot results that are reported as a result next to the error message
    fn shot_result(&self) -> Option<&'static str> {
        match self {
            Self::NotYourTurn => Some("not_your_turn"),
            Self::RepeatShot => Some("repeat"),
            _ => None,
        }
    }
}

//implementation of custom errors that are used in handlers
impl IntoResponse for CustomError {
    fn into_response(self) -> axum::response::Response {
        let error_message = match self {
            Self::InternalServerError => "Internal Server Error",
            Self::BadRequest => "Bad Request, expected a valid JSON body",
            Self::EmptyName => "Name must not be empty",
            Self::MissingShips => "No ships given",
            Self::MissingCoordinates => "No coordinates given",
            Self::GameNotFound => "Game not found",
            Self::PlayerNotFound => "Player not found in this game",
            Self::DuplicatePlayer => "A player with this name is already connected to this game",
            Self::ShipsLocked => "Ships can't be changed once the battle started, reset the game first",
            Self::GameNotStarted => "Game has not started yet",
            Self::GameOver => "Game is already over",
            Self::NotYourTurn => "It is your opponent's turn",
            Self::NoOpponent => "Opponent not found",
            Self::RepeatShot => "You already fired at this cell",
        };
        let body = match self.shot_result() {
            Some(result) => json!({"success": false, "result": result, "message": error_message}),
            None => json!({"success": false, "message": error_message}),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
