use std::collections::BTreeMap;

use serde::Serialize;
use chrono::Local;

use crate::models::board::Cell;
use crate::models::game::{Game, PlayerStatus, MAX_PLAYERS};

// The state of a game as the clients poll it
#[derive(Serialize, Debug, PartialEq)]
pub struct GameSnapshot {
    pub game_id: String,
    pub players: Vec<String>,
    pub connected: usize,
    pub game_ready: bool,
    pub game_started: bool,
    pub player_status: BTreeMap<String, PlayerStatus>,
    pub current_turn: Option<String>,
    pub shots: BTreeMap<String, Vec<Cell>>,
}

// One line in the game list
#[derive(Serialize, Debug, PartialEq)]
pub struct GameSummary {
    pub game_id: String,
    pub players: Vec<String>,
    pub connected: usize,
    pub status: &'static str,
    pub created_at: chrono::DateTime<Local>,
}

// Internal counters of a game, for the debug dump
#[derive(Serialize, Debug)]
pub struct GameDebugInfo {
    pub players: Vec<String>,
    pub player_status: BTreeMap<String, PlayerStatus>,
    pub players_count: usize,
    pub has_ships_data: bool,
    pub current_turn: Option<String>,
    pub boards_count: usize,
    pub hits_count: usize,
    pub shots_count: usize,
    pub remaining_cells: BTreeMap<String, usize>,
    pub events_count: usize,
    pub created_at: chrono::DateTime<Local>,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        let full = game.players.len() == MAX_PLAYERS;
        GameSnapshot {
            game_id: game.id.clone(),
            players: game.players.clone(),
            connected: game.players.len(),
            game_ready: full,
            game_started: game.current_turn.is_some(),
            player_status: game.player_status.clone(),
            // a stale turn is never shown while the game is not full
            current_turn: if full { game.current_turn.clone() } else { None },
            shots: game.shots.clone(),
        }
    }
}

impl From<&Game> for GameSummary {
    fn from(game: &Game) -> Self {
        GameSummary {
            game_id: game.id.clone(),
            players: game.players.clone(),
            connected: game.players.len(),
            status: if game.players.len() < MAX_PLAYERS { "waiting" } else { "ready" },
            created_at: game.created_at,
        }
    }
}

impl From<&Game> for GameDebugInfo {
    fn from(game: &Game) -> Self {
        GameDebugInfo {
            players: game.players.clone(),
            player_status: game.player_status.clone(),
            players_count: game.players.len(),
            has_ships_data: !game.ships.is_empty(),
            current_turn: game.current_turn.clone(),
            boards_count: game.boards.len(),
            hits_count: game.hits.len(),
            shots_count: game.shots.len(),
            remaining_cells: game.boards.iter().map(|(p, b)| (p.clone(), b.len())).collect(),
            events_count: game.history.len(),
            created_at: game.created_at,
        }
    }
}

impl Game {

    // Snapshot for the polling clients. A game with two ready players but no turn gets
    // its battle started here, so a query always sees a consistent battle state.
    pub fn snapshot(&mut self) -> GameSnapshot {
        self.start_battle_if_ready();
        GameSnapshot::from(&*self)
    }
}
