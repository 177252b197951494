use std::collections::BTreeMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use log::{info, warn};
use serde::Serialize;
use crate::controllers::game::MessageResponse;
use crate::models::snapshot::GameDebugInfo;
use crate::errors::CustomError;

use crate::AppState;

#[derive(Serialize, Debug)]
pub struct DebugDump {
    pub active_games_count: usize,
    pub games: BTreeMap<String, GameDebugInfo>,
}

// Handler for removing every game. Only the empty default game is left afterwards
pub async fn clear_all(State(state): State<AppState>) -> Result<(StatusCode, Json<MessageResponse>), CustomError> {

    warn!("clear all request");

    state.registry()?.clear_all();

    Ok((StatusCode::OK, Json(MessageResponse { success: true, message: "All games cleared".to_string() })))
}

//handler for dumping the internal counters of all games
pub async fn debug_dump(State(state): State<AppState>) -> Result<(StatusCode, Json<DebugDump>), CustomError> {

    info!("debug request");

    let registry = state.registry()?;
    let games: BTreeMap<String, GameDebugInfo> = registry.debug_info().into_iter().collect();

    Ok((StatusCode::OK, Json(DebugDump { active_games_count: registry.len(), games })))
}
