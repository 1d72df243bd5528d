use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

use trend_relay::api::{create_router, AppState};
use trend_relay::config::TimingConfig;
use trend_relay::relay::{Credentials, RelayService};

const CONTROLLER_KEY: &str = "controller-test-key";
const BOT_KEY: &str = "bot-test-key";

fn build_app(timing: TimingConfig) -> Router {
    let relay = RelayService::new(Credentials::new(CONTROLLER_KEY, BOT_KEY), timing);
    create_router(AppState::new(relay))
}

fn app() -> Router {
    build_app(TimingConfig::default())
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request_builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("user-agent", "MetaTrader-test");

    let request = if let Some(payload) = body {
        request_builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("failed to build json request")
    } else {
        request_builder
            .body(Body::empty())
            .expect("failed to build empty request")
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not json")
    };

    (status, body)
}

async fn send_raw(app: &Router, uri: &str, raw: &str) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_string()))
        .expect("failed to build raw request");

    app.clone()
        .oneshot(request)
        .await
        .expect("router request failed")
        .status()
}

async fn command(app: &Router, mut payload: Value) -> (StatusCode, Value) {
    payload["controllerkey"] = json!(CONTROLLER_KEY);
    send_json(app, Method::POST, "/api/commands", Some(payload)).await
}

async fn sync(app: &Router, since: Option<i64>) -> Value {
    let uri = match since {
        Some(cursor) => format!("/api/getcommands?botkey={}&since={}", BOT_KEY, cursor),
        None => format!("/api/getcommands?botkey={}", BOT_KEY),
    };
    let (status, body) = send_json(app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK, "sync failed: {}", body);
    body
}

#[tokio::test]
async fn trend_change_reaches_polling_bot() {
    let app = app();

    let (status, body) = command(&app, json!({"action": "trend_change", "trend": "BUY"})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "success");
    assert_eq!(body["currentState"]["trend"], "BUY");

    let body = sync(&app, None).await;
    assert_eq!(body["currentTrend"]["direction"], "BUY");
    let commands = body["recentCommands"].as_array().unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0]["commandType"], "trend_change");
    assert_eq!(commands[0]["oldTrend"], "NONE");
    assert_eq!(commands[0]["newTrend"], "BUY");
    assert!(body["serverTime"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn remote_trade_is_pending_until_confirmed() {
    let app = app();

    let (status, _) = command(&app, json!({"action": "remote_trade", "tradeType": "SELL"})).await;
    assert_eq!(status, StatusCode::OK);

    let body = sync(&app, None).await;
    let trades = body["remoteTrades"].as_array().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["type"], "SELL");
    assert_eq!(trades[0]["executed"], false);
    let trade_id = trades[0]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/bot-confirm?botkey={}", BOT_KEY),
        Some(json!({
            "commandType": "remote_trade",
            "status": "executed",
            "tradeId": trade_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let body = sync(&app, None).await;
    assert!(body["remoteTrades"].as_array().unwrap().is_empty());
    let last = body["recentCommands"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["commandType"], "bot_confirmation");
    assert_eq!(last["originalCommand"], "remote_trade");
    assert_eq!(last["tradeId"], trade_id);
}

#[tokio::test]
async fn confirming_unknown_trade_is_silent() {
    let app = app();
    let uri = format!("/api/bot-confirm?botkey={}", BOT_KEY);
    for _ in 0..2 {
        let (status, body) = send_json(
            &app,
            Method::POST,
            &uri,
            Some(json!({"commandType": "remote_trade", "status": "executed", "tradeId": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "confirmed");
    }

    let (_, health) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["remoteTrades"], 0);
}

#[tokio::test]
async fn rejected_credentials_change_nothing() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/commands",
        Some(json!({"controllerkey": BOT_KEY, "action": "start_stop", "active": true})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    // No body at all counts as a missing credential
    let (status, _) = send_json(&app, Method::POST, "/api/commands", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&app, Method::GET, "/api/getcommands?botkey=wrong", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&app, Method::GET, "/api/trend-status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/reset",
        Some(json!({"controllerkey": "guess"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, health) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["isActive"], false);
    assert_eq!(health["connectedBots"], 0);
    assert_eq!(health["recentCommands"], 0);
}

#[tokio::test]
async fn invalid_trend_is_rejected() {
    let app = app();

    let (status, body) = command(&app, json!({"action": "trend_change", "trend": "SIDEWAYS"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = command(&app, json!({"action": "remote_trade", "tradeType": "HOLD"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = sync(&app, None).await;
    assert_eq!(body["currentTrend"]["direction"], "NONE");
    assert!(body["recentCommands"].as_array().unwrap().is_empty());
    assert!(body["remoteTrades"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_action_succeeds_without_effect() {
    let app = app();

    let (status, body) = command(&app, json!({"action": "launch_rockets"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["currentState"]["trend"], "NONE");

    let body = sync(&app, None).await;
    assert!(body["recentCommands"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn since_cursor_filters_log() {
    let app = app();

    command(&app, json!({"action": "trend_change", "trend": "SELL"})).await;
    let first = sync(&app, None).await;
    let cursor = first["serverTime"].as_i64().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    command(&app, json!({"action": "start_stop", "active": "true"})).await;

    let body = sync(&app, Some(cursor)).await;
    let commands = body["recentCommands"].as_array().unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0]["commandType"], "start_stop");
    assert_eq!(commands[0]["command"], "START");

    // Legacy cursor name and malformed cursors
    let (_, legacy) = send_json(
        &app,
        Method::GET,
        &format!("/api/getcommands?botkey={}&lastsync={}", BOT_KEY, cursor),
        None,
    )
    .await;
    assert_eq!(legacy["recentCommands"].as_array().unwrap().len(), 1);

    let (_, garbage) = send_json(
        &app,
        Method::GET,
        &format!("/api/getcommands?botkey={}&since=yesterday", BOT_KEY),
        None,
    )
    .await;
    assert_eq!(garbage["recentCommands"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn reset_restores_defaults() {
    let app = app();

    command(&app, json!({"action": "trend_change", "trend": "BOTH"})).await;
    command(&app, json!({"action": "start_stop", "active": true})).await;
    command(&app, json!({"action": "remote_trade", "tradeType": "BUY"})).await;
    command(&app, json!({"action": "breakeven_close"})).await;
    sync(&app, None).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/reset",
        Some(json!({"controllerkey": CONTROLLER_KEY})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Complete reset performed");

    let (_, dump) = send_json(&app, Method::GET, "/api/debug", None).await;
    assert_eq!(dump["currentTrend"]["direction"], "NONE");
    assert_eq!(dump["currentTrend"]["isActive"], false);
    assert_eq!(dump["currentTrend"]["forceClose"], false);
    assert_eq!(dump["breakEvenCommand"]["active"], false);
    assert!(dump["recentCommands"].as_array().unwrap().is_empty());
    assert!(dump["remoteTrades"].as_array().unwrap().is_empty());
    assert!(dump["connectedBots"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn account_info_rides_along_with_commands() {
    let app = app();

    command(
        &app,
        json!({
            "action": "start_stop",
            "active": true,
            "account": {"number": 123456, "balance": 1000.5, "broker": "Demo", "nested": {"x": 1}}
        }),
    )
    .await;

    let body = sync(&app, None).await;
    let account = &body["controllerAccount"];
    assert_eq!(account["number"], 123456);
    assert_eq!(account["broker"], "Demo");
    assert!(account.get("nested").is_none());
    assert!(account["lastUpdated"].is_string());

    let (_, health) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["controllerAccount"], "123456");
}

#[tokio::test]
async fn verify_bot_does_not_register_liveness() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/verify-bot",
        Some(json!({"botkey": BOT_KEY})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "authorized");
    assert_eq!(body["currentTrend"]["direction"], "NONE");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/verify-bot",
        Some(json!({"botkey": CONTROLLER_KEY})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "unauthorized");

    let (_, health) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["connectedBots"], 0);
}

#[tokio::test]
async fn quick_status_and_stats() {
    let app = app();

    command(&app, json!({"action": "remote_trade", "tradeType": "BUY"})).await;
    command(&app, json!({"action": "trend_change", "trend": "ENTRAMBI"})).await;

    let (status, quick) = send_json(
        &app,
        Method::GET,
        &format!("/api/trend-status?botkey={}", BOT_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quick["trend"], "BOTH");
    assert_eq!(quick["pendingTrades"], 1);

    let (status, stats) = send_json(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["summary"]["currentTrend"], "BOTH");
    assert_eq!(stats["summary"]["pendingRemoteTrades"], 1);
    assert_eq!(stats["summary"]["connectedBots"], 1);
    assert_eq!(stats["commandStats"]["remote_trade"], 1);
    assert_eq!(stats["commandStats"]["trend_change"], 1);
    assert_eq!(stats["connectedBots"].as_array().unwrap().len(), 1);
    assert!(stats["serverUptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn force_close_clears_itself() {
    let app = build_app(TimingConfig {
        force_close_reset_ms: 40,
        ..TimingConfig::default()
    });

    let (_, body) = command(&app, json!({"action": "force_close", "forceclose": true})).await;
    assert_eq!(body["currentState"]["forceClose"], true);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let (_, health) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["forceClose"], false);
}

#[tokio::test]
async fn malformed_fields_with_valid_key_are_bad_requests() {
    let app = app();

    let (status, body) = command(&app, json!({"action": "trend_change", "trend": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_ne!(body["error"], "Unauthorized");

    let (status, _) = command(&app, json!({"action": "remote_trade", "tradeType": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A non-string action is just another unknown action
    let (status, body) = command(&app, json!({"action": 7})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let body = sync(&app, None).await;
    assert_eq!(body["currentTrend"]["direction"], "NONE");
    assert!(body["recentCommands"].as_array().unwrap().is_empty());
    assert!(body["remoteTrades"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_confirmation_is_reported() {
    let app = app();
    let uri = format!("/api/bot-confirm?botkey={}", BOT_KEY);

    let (status, body) = send_json(
        &app,
        Method::POST,
        &uri,
        Some(json!({"commandType": 7, "status": "done"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let body = sync(&app, None).await;
    let last = body["recentCommands"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["commandType"], "bot_confirmation");
    assert_eq!(last["originalCommand"], "7");
    assert_eq!(last["confirmationStatus"], "done");

    assert_eq!(send_raw(&app, &uri, "\"done\"").await, StatusCode::BAD_REQUEST);
    assert_eq!(send_raw(&app, &uri, "{not json").await, StatusCode::BAD_REQUEST);
    assert_eq!(
        send_raw(&app, "/api/bot-confirm?botkey=wrong", "{not json").await,
        StatusCode::UNAUTHORIZED
    );

    // Rejected bodies leave no record behind
    let (_, health) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["recentCommands"], 1);
}

#[tokio::test]
async fn status_update_applies_present_fields() {
    let app = app();

    command(&app, json!({"action": "trend_change", "trend": "SELL"})).await;
    let (status, body) = command(
        &app,
        json!({
            "action": "status_update",
            "trend": "SIDEWAYS",
            "active": "true",
            "forceclose": false,
            "account": {"number": 42, "equity": 990.25}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["currentState"]["trend"], "SELL");
    assert_eq!(body["currentState"]["active"], true);
    assert_eq!(body["currentState"]["forceClose"], false);

    let body = sync(&app, None).await;
    let last = body["recentCommands"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["commandType"], "status_update");
    assert_eq!(last["trend"], "SELL");
    assert_eq!(last["active"], true);
    assert_eq!(last["forceClose"], false);
    assert_eq!(body["controllerAccount"]["number"], 42);
    assert_eq!(body["controllerAccount"]["equity"], 990.25);

    // Explicit null counts as present and clears the flag
    let (_, body) = command(
        &app,
        json!({"action": "status_update", "trend": "BUY", "active": null}),
    )
    .await;
    assert_eq!(body["currentState"]["trend"], "BUY");
    assert_eq!(body["currentState"]["active"], false);
}
