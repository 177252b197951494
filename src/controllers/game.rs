use axum::{
    Form, Json,
    extract::{Query, State, rejection::FormRejection},
    http::StatusCode,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use crate::models::event::GameEvent;
use crate::models::registry::DEFAULT_GAME_ID;
use crate::models::snapshot::{GameSnapshot, GameSummary};
use crate::errors::CustomError;

use crate::AppState;

// The game a request is about, taken from the query string. Defaults to the default game
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct GameQuery {
    pub game_id: Option<String>,
}

impl GameQuery {
    pub fn id(&self) -> &str {
        match self.game_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => DEFAULT_GAME_ID,
        }
    }
}

// The form used for connecting to a game
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ConnectForm {
    pub name: Option<String>,
    pub game_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ConnectResponse {
    pub success: bool,
    pub game_ready: bool,
    pub game_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct StateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub snapshot: GameSnapshot,
}

#[derive(Serialize, Debug)]
pub struct GamesResponse {
    pub success: bool,
    pub games: Vec<GameSummary>,
    pub total_games: usize,
}

#[derive(Serialize, Debug)]
pub struct HistoryResponse {
    pub success: bool,
    pub game_id: String,
    pub events: Vec<GameEvent>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for joining a game. When the game is already full the player ends up in a new game
pub async fn connect(   State(state): State<AppState>,
                        form: Result<Form<ConnectForm>, FormRejection>,
                        ) -> Result<(StatusCode, Json<ConnectResponse>), CustomError> {

    info!("connect request");

    let Form(form) = form.map_err(|err| {
        error!("Invalid connect form: {:?}", err);
        CustomError::BadRequest
    })?;
    let name = form.name.unwrap_or_default();
    let query = GameQuery { game_id: form.game_id };
    let requested_id = query.id();

    let mut registry = state.registry()?;
    let (game_id, game_ready) = registry.join(Some(requested_id), &name)?;

    debug!("Player {} joined game {} (ready: {})", name, game_id, game_ready);

    // The requested game was full, tell the player where they went
    let message = if game_id != requested_id {
        Some(format!("Created new game (ID: {}). Waiting for a second player...", game_id))
    } else {
        None
    };

    Ok((StatusCode::OK, Json(ConnectResponse { success: true, game_ready, game_id, message })))
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for polling the state of a game. This can start the battle when both players are ready
pub async fn get_state( State(state): State<AppState>,
                        Query(query): Query<GameQuery>,
                        ) -> Result<(StatusCode, Json<StateResponse>), CustomError> {

    debug!("state request for game {}", query.id());

    let mut registry = state.registry()?;
    let snapshot = registry.get_mut(query.id())?.snapshot();

    Ok((StatusCode::OK, Json(StateResponse { success: true, snapshot })))
}

//handler for listing all games
pub async fn list_games(State(state): State<AppState>) -> Result<(StatusCode, Json<GamesResponse>), CustomError> {

    info!("list games request");

    let games = state.registry()?.list_all();
    let total_games = games.len();

    Ok((StatusCode::OK, Json(GamesResponse { success: true, games, total_games })))
}

//handler for the event log of a game
pub async fn get_history(   State(state): State<AppState>,
                            Query(query): Query<GameQuery>,
                            ) -> Result<(StatusCode, Json<HistoryResponse>), CustomError> {

    info!("history request for game {}", query.id());

    let registry = state.registry()?;
    let game = registry.get(query.id())?;

    Ok((StatusCode::OK, Json(HistoryResponse {
        success: true,
        game_id: game.id.clone(),
        events: game.history.events().to_vec(),
    })))
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for resetting a game. The players stay, everything else is cleared
pub async fn reset( State(state): State<AppState>,
                    Query(query): Query<GameQuery>,
                    ) -> Result<(StatusCode, Json<MessageResponse>), CustomError> {

    info!("reset request for game {}", query.id());

    let mut registry = state.registry()?;
    registry.get_mut(query.id())?.reset();

    Ok((StatusCode::OK, Json(MessageResponse { success: true, message: format!("Game {} has been reset", query.id()) })))
}
