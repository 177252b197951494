pub mod board;
pub mod event;
pub mod game;
pub mod registry;
pub mod snapshot;
