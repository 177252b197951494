use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use chrono::Local;
use log::{debug, info};

use crate::models::board::{Board, Cell, Ship};
use crate::models::event::{EventLog, EventType};

pub const MAX_PLAYERS: usize = 2;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Waiting,
    PlacingShips,
    Ready,
    Battle,
    Win,
    Lose,
}

impl PlayerStatus {
    pub fn is_final(self) -> bool {
        matches!(self, PlayerStatus::Win | PlayerStatus::Lose)
    }

    // Ships are fixed from the start of the battle until the game is reset
    pub fn ships_locked(self) -> bool {
        matches!(self, PlayerStatus::Battle | PlayerStatus::Win | PlayerStatus::Lose)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShotOutcome {
    Hit,
    Miss,
    Win,
}

// Everything that can go wrong while operating on a game. None of these are fatal,
// they are reported back to the player that made the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    EmptyName,
    MissingShips,
    MatchNotFound,
    PlayerNotFound,
    DuplicatePlayer,
    MatchFull,
    ShipsLocked,
    GameNotStarted,
    GameOver,
    NotYourTurn,
    NoOpponent,
    RepeatShot,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name must not be empty"),
            Self::MissingShips => write!(f, "No ships given"),
            Self::MatchNotFound => write!(f, "Game not found"),
            Self::PlayerNotFound => write!(f, "Player not found in this game"),
            Self::DuplicatePlayer => write!(f, "A player with this name is already in this game"),
            Self::MatchFull => write!(f, "Game already has two players"),
            Self::ShipsLocked => write!(f, "Ships can't be changed once the battle started, reset the game first"),
            Self::GameNotStarted => write!(f, "Game has not started yet"),
            Self::GameOver => write!(f, "Game is already over"),
            Self::NotYourTurn => write!(f, "It is your opponent's turn"),
            Self::NoOpponent => write!(f, "Opponent not found"),
            Self::RepeatShot => write!(f, "You already fired at this cell"),
        }
    }
}

impl std::error::Error for MatchError {}

// A single two player game. All mutation goes through the methods below; the registry
// lock guarantees only one of them runs at a time for any game.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: String,
    pub players: Vec<String>,
    pub player_status: BTreeMap<String, PlayerStatus>,
    pub ships: BTreeMap<String, Vec<Ship>>,
    pub boards: BTreeMap<String, Board>,
    // cells fired at a player by the opponent, used to detect repeated shots
    pub hits: BTreeMap<String, Vec<Cell>>,
    // cells fired at a player, for display
    pub shots: BTreeMap<String, Vec<Cell>>,
    pub current_turn: Option<String>,
    pub created_at: chrono::DateTime<Local>,
    pub history: EventLog,
}

impl Game {

    pub fn new(id: impl Into<String>) -> Self {
        Game {
            id: id.into(),
            players: Vec::new(),
            player_status: BTreeMap::new(),
            ships: BTreeMap::new(),
            boards: BTreeMap::new(),
            hits: BTreeMap::new(),
            shots: BTreeMap::new(),
            current_turn: None,
            created_at: Local::now(),
            history: EventLog::default(),
        }
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn status_of(&self, name: &str) -> Option<PlayerStatus> {
        self.player_status.get(name).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.player_status.values().any(|s| s.is_final())
    }

    fn opponent_of(&self, name: &str) -> Option<&str> {
        self.players.iter().map(String::as_str).find(|p| *p != name)
    }

    // Add a player. Returns true when this join filled the game.
    pub fn join(&mut self, name: &str) -> Result<bool, MatchError> {
        if name.trim().is_empty() {
            return Err(MatchError::EmptyName);
        }
        if self.has_player(name) {
            return Err(MatchError::DuplicatePlayer);
        }
        if self.is_full() {
            return Err(MatchError::MatchFull);
        }

        self.players.push(name.to_string());
        self.player_status.insert(name.to_string(), PlayerStatus::Waiting);
        self.history.record(EventType::PlayerConnect, Some(name), None);

        if self.players.len() == MAX_PLAYERS {
            for p in &self.players {
                self.player_status.insert(p.clone(), PlayerStatus::PlacingShips);
            }
            self.history.record(EventType::GameStart, None, None);
            info!("Game {} has two players, placing ships", self.id);
            return Ok(true);
        }
        Ok(false)
    }

    // Store the ship layout of a player. An empty list is a valid (if hopeless) layout.
    // Returns true if this submission started the battle.
    pub fn submit_ships(&mut self, name: &str, ships: Option<Vec<Ship>>) -> Result<bool, MatchError> {
        let ships = ships.ok_or(MatchError::MissingShips)?;
        let status = self.status_of(name).ok_or(MatchError::PlayerNotFound)?;
        if status.ships_locked() || self.current_turn.is_some() {
            return Err(MatchError::ShipsLocked);
        }

        debug!("Player {} in game {} placed {} ships", name, self.id, ships.len());
        self.ships.insert(name.to_string(), ships);
        self.player_status.insert(name.to_string(), PlayerStatus::Ready);

        Ok(self.start_battle_if_ready())
    }

    // The battle start transition. Runs only when both players are ready and no turn is set,
    // so calling it again after the battle started is a no-op.
    pub fn start_battle_if_ready(&mut self) -> bool {
        let all_ready = self.players.len() == MAX_PLAYERS
            && self.players.iter().all(|p| self.status_of(p) == Some(PlayerStatus::Ready));
        if !all_ready || self.current_turn.is_some() {
            return false;
        }

        for p in &self.players {
            let board = self.ships.get(p).map(|s| Board::from_ships(s)).unwrap_or_default();
            self.boards.insert(p.clone(), board);
            self.hits.insert(p.clone(), Vec::new());
            self.shots.insert(p.clone(), Vec::new());
            self.player_status.insert(p.clone(), PlayerStatus::Battle);
        }
        self.current_turn = self.players.first().cloned();

        info!("Game {} started, first turn: {:?}", self.id, self.current_turn);
        true
    }

    pub fn shoot(&mut self, name: &str, x: i64, y: i64) -> Result<ShotOutcome, MatchError> {
        if !self.has_player(name) {
            return Err(MatchError::PlayerNotFound);
        }
        let current_turn = self.current_turn.as_deref().ok_or(MatchError::GameNotStarted)?;
        if self.is_finished() {
            return Err(MatchError::GameOver);
        }
        if current_turn != name {
            return Err(MatchError::NotYourTurn);
        }
        let enemy = self.opponent_of(name).ok_or(MatchError::NoOpponent)?.to_string();

        let shot = Cell(x, y);
        let incoming = self.hits.entry(enemy.clone()).or_default();
        if incoming.contains(&shot) {
            return Err(MatchError::RepeatShot);
        }
        incoming.push(shot);
        self.shots.entry(enemy.clone()).or_default().push(shot);

        let board = self.boards.entry(enemy.clone()).or_default();
        if !board.remove_hit(shot) {
            debug!("Game {}: {} missed at ({}, {})", self.id, name, x, y);
            self.current_turn = Some(enemy);
            return Ok(ShotOutcome::Miss);
        }

        if board.is_empty() {
            self.player_status.insert(name.to_string(), PlayerStatus::Win);
            self.player_status.insert(enemy.clone(), PlayerStatus::Lose);
            let fired = self.hits.get(&enemy).map_or(0, Vec::len);
            self.history.record(EventType::GameOver, Some(name), Some(format!("{} shots fired", fired)));
            info!("Game {} is over, {} won against {}", self.id, name, enemy);
            return Ok(ShotOutcome::Win);
        }

        debug!("Game {}: {} hit at ({}, {})", self.id, name, x, y);
        Ok(ShotOutcome::Hit)
    }

    // Start over with the same players. Everything except the roster is thrown away.
    pub fn reset(&mut self) {
        let mut fresh = Game::new(self.id.clone());
        for p in &self.players {
            fresh.player_status.insert(p.clone(), PlayerStatus::Waiting);
        }
        fresh.players = std::mem::take(&mut self.players);
        fresh.history.record(EventType::GameReset, None, None);
        *self = fresh;
    }
}
