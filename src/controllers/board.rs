use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use crate::models::board::Ship;
use crate::models::game::ShotOutcome;
use crate::controllers::game::GameQuery;
use crate::errors::CustomError;

use crate::AppState;

// The struct used for receiving a ship layout as json
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ShipsRequest {
    pub name: Option<String>,
    pub ships: Option<Vec<Ship>>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ShipsResponse {
    pub success: bool,
    pub game_id: String,
}

// The struct used for receiving a shot as json
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ShotRequest {
    pub name: Option<String>,
    pub x: Option<i64>,
    pub y: Option<i64>,
}

#[derive(Serialize, Debug)]
pub struct ShotResponse {
    pub success: bool,
    pub result: ShotOutcome,
    pub message: &'static str,
}

// Unwrap the json body, a body that is not (valid) json is a bad request
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, CustomError> {
    body.map(|Json(value)| value).map_err(|err| {
        error!("Invalid json body: {:?}", err);
        CustomError::BadRequest
    })
}

// A name that is missing or blank
fn required_name(name: Option<String>) -> Result<String, CustomError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(CustomError::EmptyName),
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for submitting the ships of a player. When both players are ready the battle starts
pub async fn submit_ships(  State(state): State<AppState>,
                            Query(query): Query<GameQuery>,
                            body: Result<Json<ShipsRequest>, JsonRejection>,
                            ) -> Result<(StatusCode, Json<ShipsResponse>), CustomError> {

    info!("ships request for game {}", query.id());

    let request = json_body(body)?;
    let name = required_name(request.name)?;
    let ships = request.ships.ok_or(CustomError::MissingShips)?;

    let mut registry = state.registry()?;
    let game = registry.get_mut(query.id())?;

    debug!("Player {} in game {} sends {} ships", name, game.id, ships.len());
    if game.submit_ships(&name, Some(ships))? {
        info!("Both players in game {} are ready, first turn: {:?}", game.id, game.current_turn);
    }

    Ok((StatusCode::OK, Json(ShipsResponse { success: true, game_id: game.id.clone() })))
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for firing a shot. A hit keeps the turn, a miss passes it to the opponent
pub async fn shoot( State(state): State<AppState>,
                    Query(query): Query<GameQuery>,
                    body: Result<Json<ShotRequest>, JsonRejection>,
                    ) -> Result<(StatusCode, Json<ShotResponse>), CustomError> {

    info!("shoot request for game {}", query.id());

    let request = json_body(body)?;
    let name = required_name(request.name)?;
    let (x, y) = match (request.x, request.y) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(CustomError::MissingCoordinates),
    };

    let mut registry = state.registry()?;
    let result = registry.get_mut(query.id())?.shoot(&name, x, y).map_err(|err| {
        debug!("Shot by {} at ({}, {}) rejected: {}", name, x, y, err);
        CustomError::from(err)
    })?;

    let message = match result {
        ShotOutcome::Win => "You won!",
        ShotOutcome::Hit => "Hit! Your turn continues",
        ShotOutcome::Miss => "Miss! The turn passes to your opponent",
    };

    Ok((StatusCode::OK, Json(ShotResponse { success: true, result, message })))
}
