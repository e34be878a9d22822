mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use bob_shortener::domain::click_worker::run_click_worker;
use serde_json::json;
use std::time::Duration;

async fn create_for_user(server: &TestServer, url: &str) -> String {
    let response = server
        .post("/api/url")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .json(&json!({ "longURL": url }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<serde_json::Value>()["code"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_list_links_for_user() {
    let (server, _state, _rx) = common::setup();

    for path in ["first", "second"] {
        server
            .post("/api/url")
            .add_header(common::IDENTITY_HEADER, common::USER)
            .json(&json!({ "longURL": format!("https://example.com/{path}") }))
            .await
            .assert_status(StatusCode::CREATED);
    }
    // A guest link must not show up in the user's list.
    server
        .post("/api/url")
        .json(&json!({ "longURL": "https://example.com/guest" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get("/api/url")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["total"], 2);

    let items = json["items"].as_array().unwrap();
    assert_eq!(items[0]["longURL"], "https://example.com/second");
    assert_eq!(items[1]["longURL"], "https://example.com/first");
}

#[tokio::test]
async fn test_list_links_requires_account() {
    let (server, _state, _rx) = common::setup();

    let response = server.get("/api/url").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_link() {
    let (server, _state, _rx) = common::setup();

    let code = create_for_user(&server, "https://example.com/a").await;

    let response = server
        .get(&format!("/api/url/{code}"))
        .add_header(common::IDENTITY_HEADER, common::USER)
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], code);
    assert_eq!(json["longURL"], "https://example.com/a");
    assert!(json["createdAt"].is_string());
}

#[tokio::test]
async fn test_get_link_not_found() {
    let (server, _state, _rx) = common::setup();

    server
        .get("/api/url/missing")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_get_link_requires_account() {
    let (server, _state, _rx) = common::setup();

    let code = create_for_user(&server, "https://example.com/a").await;

    server
        .get(&format!("/api/url/{code}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_link_hidden_from_other_accounts() {
    let (server, _state, _rx) = common::setup();

    let code = create_for_user(&server, "https://example.com/a").await;

    server
        .get(&format!("/api/url/{code}"))
        .add_header(common::IDENTITY_HEADER, common::OTHER_USER)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_link_by_owner() {
    let (server, _state, _rx) = common::setup();

    server
        .post("/api/url")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .json(&json!({
            "longURL": "https://example.com/before",
            "customShortURL": "editme"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .patch("/api/url/editme")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .json(&json!({ "longURL": "https://example.com/after", "disable": true }))
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["longURL"], "https://example.com/after");
    assert_eq!(json["disabled"], true);

    let fetched = server
        .get("/api/url/editme")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .await
        .json::<serde_json::Value>();
    assert_eq!(fetched["longURL"], "https://example.com/after");
    assert_eq!(fetched["disabled"], true);
}

#[tokio::test]
async fn test_update_link_by_stranger_is_not_found() {
    let (server, _state, _rx) = common::setup();

    server
        .post("/api/url")
        .json(&json!({ "longURL": "https://example.com/a" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .patch("/api/url/2dce0a")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .json(&json!({ "disable": true }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_update_link_requires_a_change() {
    let (server, _state, _rx) = common::setup();

    server
        .post("/api/url")
        .json(&json!({ "longURL": "https://example.com/a" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.patch("/api/url/2dce0a").json(&json!({})).await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_update_link_rejects_invalid_url() {
    let (server, _state, _rx) = common::setup();

    server
        .post("/api/url")
        .json(&json!({ "longURL": "https://example.com/a" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .patch("/api/url/2dce0a")
        .json(&json!({ "longURL": "javascript:alert(1)" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_click_history_after_worker_drains() {
    let (server, state, rx) = common::setup();
    tokio::spawn(run_click_worker(rx, state.link_repository.clone(), 2));

    let code = create_for_user(&server, "https://example.com/a").await;

    server
        .get(&format!("/{code}"))
        .add_header(
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        )
        .await
        .assert_status(StatusCode::FOUND);

    let mut history = serde_json::Value::Null;
    for _ in 0..50 {
        let response = server
            .get(&format!("/api/url/{code}/clicks"))
            .add_header(common::IDENTITY_HEADER, common::USER)
            .await;
        response.assert_status_ok();
        history = response.json::<serde_json::Value>();
        if history["total"] == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(history["code"], code);
    assert_eq!(history["total"], 1);
    let click = &history["items"][0];
    assert_eq!(click["ip"], "127.0.0.1");
    assert_eq!(click["browser"], "Chrome");
    assert_eq!(click["deviceType"], "desktop");
}

#[tokio::test]
async fn test_click_history_unknown_code() {
    let (server, _state, _rx) = common::setup();

    server
        .get("/api/url/missing/clicks")
        .add_header(common::IDENTITY_HEADER, common::USER)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_click_history_hidden_from_guests_and_strangers() {
    let (server, _state, _rx) = common::setup();

    let code = create_for_user(&server, "https://example.com/a").await;
    server
        .get(&format!("/{code}"))
        .add_header("X-Forwarded-For", "203.0.113.77")
        .await
        .assert_status(StatusCode::FOUND);

    server
        .get(&format!("/api/url/{code}/clicks"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get(&format!("/api/url/{code}/clicks"))
        .add_header(common::IDENTITY_HEADER, common::OTHER_USER)
        .await
        .assert_status_not_found();
}
