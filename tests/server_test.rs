use std::{str::FromStr, sync::Arc};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chat_directory::{
    chat_store::{Account, FriendEntry, LocalChatStore, MessageEntry, MessageReceipt},
    server::{router, CALLER_HEADER},
    GatewayHandle,
};

const ALICE_PRIV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const BOB_PRIV_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const CARLA_PRIV_KEY: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

fn wallet_address(priv_key: &str) -> Address {
    PrivateKeySigner::from_str(priv_key)
        .expect("Failed to parse private key")
        .address()
}

fn request(
    method: Method,
    uri: &str,
    caller: Option<Address>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, caller: Address, name: &str) {
    let (status, _) = call(
        app,
        request(
            Method::POST,
            "/accounts",
            Some(caller),
            Some(json!({ "display_name": name })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn spawn_app() -> (GatewayHandle, Router) {
    let gateway = GatewayHandle::spawn(Arc::new(LocalChatStore::new()), 16);
    let app = router(gateway.clone());
    (gateway, app)
}

#[tokio::test]
async fn test_account_routes() {
    let alice = wallet_address(ALICE_PRIV_KEY);
    let bob = wallet_address(BOB_PRIV_KEY);
    let (gateway, app) = spawn_app();

    register(&app, alice, "alice").await;
    register(&app, bob, "bob").await;

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/accounts",
            Some(alice),
            Some(json!({ "display_name": "again" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "AlreadyExists");

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/accounts",
            Some(wallet_address(CARLA_PRIV_KEY)),
            Some(json!({ "display_name": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username cannot be empty");

    let (status, body) = call(
        &app,
        request(Method::GET, &format!("/accounts/{alice}/username"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "alice");

    let (status, body) = call(&app, request(Method::GET, "/accounts", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let accounts: Vec<Address> = serde_json::from_value(body).unwrap();
    assert_eq!(accounts, vec![alice, bob]);

    let (status, body) = call(&app, request(Method::GET, "/users", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let users: Vec<Account> = serde_json::from_value(body).unwrap();
    assert_eq!(users[1].owner, bob);
    assert_eq!(users[1].display_name, "bob");

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_unknown_username_is_not_found() {
    let carla = wallet_address(CARLA_PRIV_KEY);
    let (gateway, app) = spawn_app();

    let (status, body) = call(
        &app,
        request(Method::GET, &format!("/accounts/{carla}/username"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "NotFound");

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_caller_header_is_required() {
    let (gateway, app) = spawn_app();

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/accounts",
            None,
            Some(json!({ "display_name": "alice" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing caller address header");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/accounts")
        .header(CALLER_HEADER, "not-an-address")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "display_name": "alice" }).to_string()))
        .unwrap();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "InvalidInput");

    let (status, _) = call(&app, request(Method::GET, "/friends/0x1234", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_friend_and_message_routes() {
    let alice = wallet_address(ALICE_PRIV_KEY);
    let bob = wallet_address(BOB_PRIV_KEY);
    let carla = wallet_address(CARLA_PRIV_KEY);
    let (gateway, app) = spawn_app();

    register(&app, alice, "alice").await;

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/friends",
            Some(alice),
            Some(json!({ "peer": bob.to_string(), "label": "bob" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["kind"], "PreconditionFailed(peer unregistered)");

    register(&app, bob, "bob").await;
    register(&app, carla, "carla").await;

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/messages",
            Some(alice),
            Some(json!({ "peer": bob.to_string(), "content": "early" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["kind"], "PreconditionFailed(not friends)");

    let (status, _) = call(
        &app,
        request(
            Method::POST,
            "/friends",
            Some(alice),
            Some(json!({ "peer": bob.to_string(), "label": "bob" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        request(Method::GET, &format!("/friends/{bob}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let friends: Vec<FriendEntry> = serde_json::from_value(body).unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].peer, alice);

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/messages",
            Some(bob),
            Some(json!({ "peer": alice.to_string(), "content": "hello" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let receipt: MessageReceipt = serde_json::from_value(body).unwrap();
    assert_eq!(receipt.index, 0);

    let (status, body) = call(
        &app,
        request(Method::GET, &format!("/messages/{alice}/{bob}"), Some(alice), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let log: Vec<MessageEntry> = serde_json::from_value(body).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].sender, bob);
    assert_eq!(log[0].content, "hello");

    let (status, body) = call(
        &app,
        request(Method::GET, &format!("/messages/{alice}/{bob}"), Some(carla), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "Forbidden");

    gateway.shutdown().await;
}

#[tokio::test]
async fn test_stopped_gateway_is_unavailable() {
    let alice = wallet_address(ALICE_PRIV_KEY);
    let (gateway, app) = spawn_app();
    gateway.shutdown().await;

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/accounts",
            Some(alice),
            Some(json!({ "display_name": "alice" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "Unavailable");
}
