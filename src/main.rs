use axum::{routing::{get, post}, Router};
use std::{env, net::{IpAddr, SocketAddr}, sync::{Arc, Mutex, MutexGuard}};
use anyhow::Context;
use log::{debug, error, info};
use simplelog::*;
mod errors;
mod controllers;
mod models;
use crate::errors::CustomError;
use crate::models::registry::Registry;

// Shared state: all games live in one registry behind one lock.
// Every handler does its work while holding the lock, so requests on a game never interleave.
#[derive(Clone, Default)]
pub struct AppState {
    pub registry: Arc<Mutex<Registry>>,
}

impl AppState {

    // Helper to lock the registry. A poisoned lock means a handler panicked halfway, we don't trust the state anymore
    pub fn registry(&self) -> Result<MutexGuard<'_, Registry>, CustomError> {
        self.registry.lock().map_err(|err| {
            error!("Registry lock poisoned: {}", err);
            CustomError::InternalServerError
        })
    }
}

// Settings taken from the environment, all optional
struct Settings {
    host: IpAddr,
    port: u16,
    log_level: LevelFilter,
}

impl Settings {
    fn from_env() -> anyhow::Result<Settings> {
        Settings::from_lookup(|key| env::var(key).ok())
    }

    // Build the settings from any key/value source, unset keys get their default
    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> anyhow::Result<Settings> {
        let host = match lookup("SEABATTLE_HOST") {
            Some(host) => host.parse::<IpAddr>().with_context(|| format!("$SEABATTLE_HOST is not an IP address: {}", host))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = match lookup("SEABATTLE_PORT") {
            Some(port) => port.parse::<u16>().with_context(|| format!("$SEABATTLE_PORT is not a port number: {}", port))?,
            None => 5000,
        };
        let log_level = match lookup("SEABATTLE_LOG") {
            Some(level) => level.parse::<LevelFilter>().with_context(|| format!("$SEABATTLE_LOG is not a log level: {}", level))?,
            None => LevelFilter::Debug,
        };
        Ok(Settings { host, port, log_level })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/connect", post(controllers::game::connect))
        .route("/state", get(controllers::game::get_state))
        .route("/games", get(controllers::game::list_games))
        .route("/history", get(controllers::game::get_history))
        .route("/reset", post(controllers::game::reset))
        .route("/ships", post(controllers::board::submit_ships))
        .route("/shoot", post(controllers::board::shoot))
        .route("/clear_all", post(controllers::server::clear_all))
        .route("/debug", get(controllers::server::debug_dump))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {

    let settings = Settings::from_env()?;

    // set up tracing facility
    let _ = SimpleLogger::init(settings.log_level, Config::default());
    info!("Starting..");

    let state = AppState::default();
    let app = app(state);

    let addr = SocketAddr::new(settings.host, settings.port);
    info!("Sea battle server, all games are kept in memory and are lost on restart");
    info!("  POST /connect    - join a game");
    info!("  GET  /state      - state of a game");
    info!("  GET  /games      - list all games");
    info!("  GET  /history    - event log of a game");
    info!("  POST /ships      - submit ships");
    info!("  POST /shoot      - fire a shot");
    info!("  POST /reset      - reset a game");
    info!("  POST /clear_all  - remove all games");
    info!("  GET  /debug      - debug info of all games");
    debug!("Listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())

}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{header::CONTENT_TYPE, Request, StatusCode}};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app(AppState::default()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn settings_defaults() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.host, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }

    #[test]
    fn settings_from_values() {
        let settings = Settings::from_lookup(|key| match key {
            "SEABATTLE_HOST" => Some("127.0.0.1".to_string()),
            "SEABATTLE_PORT" => Some("8080".to_string()),
            "SEABATTLE_LOG" => Some("warn".to_string()),
            _ => None,
        }).unwrap();
        assert_eq!(settings.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.log_level, LevelFilter::Warn);
    }

    #[test]
    fn settings_reject_invalid_port() {
        let result = Settings::from_lookup(|key| (key == "SEABATTLE_PORT").then(|| "seventy".to_string()));
        let err = result.err().unwrap();
        assert!(err.to_string().contains("SEABATTLE_PORT"));
    }

    #[tokio::test]
    async fn connect_takes_a_form() {
        let request = Request::builder()
            .method("POST")
            .uri("/connect")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=alice&game_id=7"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["game_id"], "7");
        assert_eq!(body["game_ready"], false);
    }

    #[tokio::test]
    async fn shoot_without_json_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/shoot?game_id=1")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from("x=1,y=2"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn ships_with_broken_json_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/ships")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": \"alice\", \"ships\": "))
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn state_of_unknown_game_is_not_found() {
        let request = Request::builder().uri("/state?game_id=404").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Game not found");
    }

    #[tokio::test]
    async fn state_of_default_game() {
        let request = Request::builder().uri("/state").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game_id"], "1");
        assert_eq!(body["game_started"], false);
        assert_eq!(body["current_turn"], Value::Null);
    }
}
