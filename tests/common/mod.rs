#![allow(dead_code)]

use axum::extract::connect_info::MockConnectInfo;
use axum_test::TestServer;
use bob_shortener::config::Config;
use bob_shortener::domain::click_event::ClickEvent;
use bob_shortener::routes::build_router;
use bob_shortener::server::{Stores, build_state};
use bob_shortener::state::AppState;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Account known to the in-memory store in every test.
pub const USER: &str = "alice@example.com";

/// Second known account, owning nothing.
pub const OTHER_USER: &str = "bob@example.com";

/// Header carrying the signed-in caller.
pub const IDENTITY_HEADER: &str = "x-authenticated-user";

/// Peer address every in-process request appears to come from.
pub const PEER: &str = "127.0.0.1:12345";

pub fn test_config() -> Config {
    Config {
        seed_accounts: vec![USER.to_string(), OTHER_USER.to_string()],
        // Lets tests act as several guests through `X-Forwarded-For`.
        behind_proxy: true,
        click_queue_capacity: 100,
        ..Config::default()
    }
}

pub fn create_test_state(config: &Config) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let stores = Stores::in_memory(&config.seed_accounts);
    build_state(config, stores).unwrap()
}

pub fn test_server(state: AppState) -> TestServer {
    let addr: SocketAddr = PEER.parse().unwrap();
    let app = build_router(state, false).layer(MockConnectInfo(addr));
    TestServer::new(app).unwrap()
}

/// In-memory server with default test settings.
///
/// The click receiver must stay alive for the queue to accept events.
pub fn setup() -> (TestServer, AppState, mpsc::Receiver<ClickEvent>) {
    let (state, rx) = create_test_state(&test_config());
    (test_server(state.clone()), state, rx)
}
