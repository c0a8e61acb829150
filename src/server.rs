//! HTTP and WebSocket surface over the gateway.
//!
//! The caller of a mutation is read from the [`CALLER_HEADER`] header, set by
//! whatever authenticates the connection in front of this server.

use std::{net::SocketAddr, str::FromStr};

use alloy::primitives::Address;
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use chat_store::{Account, ErrorKind, FriendEntry, MessageEntry, MessageReceipt};

use crate::{error::GatewayError, events::ChatEvent, gateway::GatewayHandle};

pub const CALLER_HEADER: &str = "x-caller-address";

#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddFriendBody {
    pub peer: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub peer: String,
    pub content: String,
}

pub struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            Some(ErrorKind::InvalidInput) => StatusCode::BAD_REQUEST,
            Some(ErrorKind::Forbidden) => StatusCode::FORBIDDEN,
            Some(ErrorKind::NotFound) => StatusCode::NOT_FOUND,
            Some(ErrorKind::AlreadyExists) => StatusCode::CONFLICT,
            Some(ErrorKind::PreconditionFailed(_)) => StatusCode::PRECONDITION_FAILED,
            None => StatusCode::SERVICE_UNAVAILABLE,
        };
        let kind = kind.map_or_else(|| "Unavailable".to_string(), |k| k.to_string());
        let body = json!({ "kind": kind, "message": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(gateway: GatewayHandle) -> Router {
    Router::new()
        .route("/accounts", post(create_account).get(list_all_accounts))
        .route("/accounts/:address/username", get(get_username))
        .route("/users", get(list_all_users))
        .route("/friends", post(add_friend))
        .route("/friends/:address", get(get_friend_list))
        .route("/messages", post(send_message))
        .route("/messages/:a/:b", get(read_conversation))
        .route("/events", get(events))
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

/// Serve until `cancel` fires.
pub async fn serve(
    bind_addr: SocketAddr,
    gateway: GatewayHandle,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let app = router(gateway);
    let server = axum::Server::try_bind(&bind_addr)?;
    info!("Chat directory listening on {bind_addr}");
    server
        .serve(app.into_make_service())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    info!("Chat directory server stopped");
    Ok(())
}

fn caller(headers: &HeaderMap) -> Result<Address, GatewayError> {
    let value = headers
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(GatewayError::MissingCallerError)?;
    Ok(parse_address(value)?)
}

fn parse_address(value: &str) -> Result<Address, GatewayError> {
    Ok(Address::from_str(value.trim())?)
}

async fn create_account(
    State(gateway): State<GatewayHandle>,
    headers: HeaderMap,
    Json(body): Json<CreateAccountBody>,
) -> Result<StatusCode, ApiError> {
    let caller = caller(&headers)?;
    gateway.create_account(caller, &body.display_name).await?;
    Ok(StatusCode::CREATED)
}

async fn list_all_accounts(State(gateway): State<GatewayHandle>) -> Json<Vec<Address>> {
    Json(gateway.list_all_accounts().await.to_vec())
}

async fn list_all_users(State(gateway): State<GatewayHandle>) -> Json<Vec<Account>> {
    Json(gateway.list_all_users().await)
}

async fn get_username(
    State(gateway): State<GatewayHandle>,
    Path(address): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let identity = parse_address(&address)?;
    let display_name = gateway.get_username(identity).await?;
    Ok(Json(json!({ "display_name": display_name })))
}

async fn add_friend(
    State(gateway): State<GatewayHandle>,
    headers: HeaderMap,
    Json(body): Json<AddFriendBody>,
) -> Result<StatusCode, ApiError> {
    let caller = caller(&headers)?;
    let peer = parse_address(&body.peer)?;
    gateway.add_friend(caller, peer, &body.label).await?;
    Ok(StatusCode::CREATED)
}

async fn get_friend_list(
    State(gateway): State<GatewayHandle>,
    Path(address): Path<String>,
) -> Result<Json<Vec<FriendEntry>>, ApiError> {
    let identity = parse_address(&address)?;
    Ok(Json(gateway.get_friend_list(identity).await))
}

async fn send_message(
    State(gateway): State<GatewayHandle>,
    headers: HeaderMap,
    Json(body): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<MessageReceipt>), ApiError> {
    let caller = caller(&headers)?;
    let peer = parse_address(&body.peer)?;
    let receipt = gateway.send_message(caller, peer, &body.content).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn read_conversation(
    State(gateway): State<GatewayHandle>,
    headers: HeaderMap,
    Path((a, b)): Path<(String, String)>,
) -> Result<Json<Vec<MessageEntry>>, ApiError> {
    let caller = caller(&headers)?;
    let (a, b) = (parse_address(&a)?, parse_address(&b)?);
    Ok(Json(gateway.read_conversation(caller, a, b).await?))
}

async fn events(ws: WebSocketUpgrade, State(gateway): State<GatewayHandle>) -> Response {
    let receiver = gateway.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, receiver))
}

async fn forward_events(socket: WebSocket, mut receiver: broadcast::Receiver<ChatEvent>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    info!("Event subscriber connected");
    loop {
        tokio::select! {
            incoming = ws_receiver.next() => {
                // Subscribers only listen; any close or error ends the session
                match incoming {
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                }
            }
            event = receiver.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to serialize {event}: {e}");
                            continue;
                        }
                    };
                    if ws_sender.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, {skipped} events skipped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
    info!("Event subscriber disconnected");
}
