use std::collections::HashMap;

use log::info;

use crate::models::game::{Game, MatchError};
use crate::models::snapshot::{GameDebugInfo, GameSummary};

pub const DEFAULT_GAME_ID: &str = "1";
const FIRST_ALLOCATED_ID: u64 = 2;

// All games known to the server, kept in memory only. Games are never evicted,
// they live until the registry is cleared.
#[derive(Debug)]
pub struct Registry {
    games: HashMap<String, Game>,
    next_id: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {

    pub fn new() -> Self {
        let mut games = HashMap::new();
        games.insert(DEFAULT_GAME_ID.to_string(), Game::new(DEFAULT_GAME_ID));
        Registry { games, next_id: FIRST_ALLOCATED_ID }
    }

    // Get the game with this id (default id when none is given), creating it when unknown
    pub fn resolve_or_create(&mut self, game_id: Option<&str>) -> &mut Game {
        let game_id = game_id.unwrap_or(DEFAULT_GAME_ID);
        self.games
            .entry(game_id.to_string())
            .or_insert_with(|| {
                info!("Creating game {}", game_id);
                Game::new(game_id)
            })
    }

    // Allocate a fresh numeric id. Ids are never handed out twice, also not when a
    // client already created a game under that id by name.
    pub fn create_new(&mut self) -> String {
        let mut game_id = self.next_id.to_string();
        while self.games.contains_key(&game_id) {
            self.next_id += 1;
            game_id = self.next_id.to_string();
        }
        self.next_id += 1;

        info!("Creating new game {}", game_id);
        self.games.insert(game_id.clone(), Game::new(game_id.as_str()));
        game_id
    }

    pub fn get(&self, game_id: &str) -> Result<&Game, MatchError> {
        self.games.get(game_id).ok_or(MatchError::MatchNotFound)
    }

    pub fn get_mut(&mut self, game_id: &str) -> Result<&mut Game, MatchError> {
        self.games.get_mut(game_id).ok_or(MatchError::MatchNotFound)
    }

    // Join a player. A full game is left alone: the player is put in a brand new game instead.
    // Returns the id of the game joined and whether that game is now full.
    pub fn join(&mut self, game_id: Option<&str>, name: &str) -> Result<(String, bool), MatchError> {
        if name.trim().is_empty() {
            return Err(MatchError::EmptyName);
        }
        let game = self.resolve_or_create(game_id);
        match game.join(name) {
            Ok(ready) => Ok((game.id.clone(), ready)),
            Err(MatchError::MatchFull) => {
                let new_id = self.create_new();
                let ready = self.get_mut(&new_id)?.join(name)?;
                Ok((new_id, ready))
            }
            Err(err) => Err(err),
        }
    }

    pub fn list_all(&self) -> Vec<GameSummary> {
        let mut games: Vec<&Game> = self.games.values().collect();
        games.sort_by(|a, b| compare_ids(&a.id, &b.id));
        games.into_iter().map(GameSummary::from).collect()
    }

    pub fn debug_info(&self) -> Vec<(String, GameDebugInfo)> {
        let mut games: Vec<&Game> = self.games.values().collect();
        games.sort_by(|a, b| compare_ids(&a.id, &b.id));
        games.into_iter().map(|g| (g.id.clone(), GameDebugInfo::from(g))).collect()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    // Throw away every game and start over with an empty default game
    pub fn clear_all(&mut self) {
        info!("Clearing {} games", self.games.len());
        *self = Registry::new();
    }
}

// Numeric ids sort numerically ("2" before "10"), anything else lexically
fn compare_ids(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_with_default_game() {
        let registry = Registry::new();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(DEFAULT_GAME_ID).unwrap().players.is_empty());
        assert_eq!(registry.get("42").err(), Some(MatchError::MatchNotFound));
    }

    #[test]
    fn resolve_or_create_uses_default_and_creates_unknown() {
        let mut registry = Registry::new();
        assert_eq!(registry.resolve_or_create(None).id, DEFAULT_GAME_ID);
        assert_eq!(registry.resolve_or_create(Some("lobby")).id, "lobby");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn create_new_skips_taken_ids_and_never_reuses() {
        let mut registry = Registry::new();
        registry.resolve_or_create(Some("2"));
        assert_eq!(registry.create_new(), "3");
        assert_eq!(registry.create_new(), "4");
    }

    #[test]
    fn third_player_gets_new_game() {
        let mut registry = Registry::new();
        assert_eq!(registry.join(None, "alice"), Ok(("1".to_string(), false)));
        assert_eq!(registry.join(None, "bob"), Ok(("1".to_string(), true)));
        assert_eq!(registry.join(None, "carol"), Ok(("2".to_string(), false)));

        assert_eq!(registry.get("1").unwrap().players, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(registry.get("2").unwrap().players, vec!["carol".to_string()]);
    }

    #[test]
    fn blank_name_creates_nothing() {
        let mut registry = Registry::new();
        assert_eq!(registry.join(Some("9"), " "), Err(MatchError::EmptyName));
        assert_eq!(registry.get("9").err(), Some(MatchError::MatchNotFound));
    }

    #[test]
    fn duplicate_name_in_full_game_is_an_error() {
        let mut registry = Registry::new();
        registry.join(None, "alice").unwrap();
        registry.join(None, "bob").unwrap();
        assert_eq!(registry.join(None, "bob"), Err(MatchError::DuplicatePlayer));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn list_orders_numeric_ids() {
        let mut registry = Registry::new();
        for _ in 0..10 {
            registry.create_new();
        }
        let ids: Vec<String> = registry.list_all().into_iter().map(|s| s.game_id).collect();
        assert_eq!(ids.first().map(String::as_str), Some("1"));
        assert_eq!(ids.last().map(String::as_str), Some("11"));
        assert_eq!(ids[1], "2");
    }

    #[test]
    fn clear_all_leaves_one_empty_default_game() {
        let mut registry = Registry::new();
        registry.join(None, "alice").unwrap();
        registry.create_new();
        registry.create_new();
        registry.clear_all();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(DEFAULT_GAME_ID).unwrap().players.is_empty());
        assert_eq!(registry.create_new(), "2");
    }
}
