use serde::Serialize;
use chrono::Local;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PlayerConnect,
    GameStart,
    GameReset,
    GameOver,
}

#[derive(Serialize, Debug, Clone)]
pub struct GameEvent {
    pub timestamp: chrono::DateTime<Local>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub player: Option<String>,
    pub details: Option<String>,
}

// Append-only history of a single game. Only a reset wipes it (by replacing the game state).
#[derive(Serialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {

    pub fn record(&mut self, event_type: EventType, player: Option<&str>, details: Option<String>) {
        self.events.push(GameEvent {
            timestamp: Local::now(),
            event_type,
            player: player.map(str::to_string),
            details,
        });
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
