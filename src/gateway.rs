//! Operation gateway of the chat directory.
//!
//! Mutations are sent to the [`ChatGateway`] actor, whose mailbox processes
//! them one at a time. Each request is validated and committed by the store as
//! a single step, and a [`ChatEvent`] is published only after the commit.
//!
//! ```text
//! transport --GatewayHandle--> ChatGateway (mailbox) --apply--> LocalChatStore
//!                                   |
//!                                   +--broadcast--> ChatEvent subscribers
//! ```
//!
//! Queries do not go through the mailbox: [`GatewayHandle`] answers them from
//! the store under its read lock, so they run concurrently with each other.

use std::sync::Arc;

use alloy::primitives::Address;
use kameo::{actor::ActorRef, error::SendError, Actor};
use log::{debug, info};
use tokio::sync::broadcast;

use chat_store::{
    Account, ChatStoreService, DirectorySnapshot, FriendEntry, LocalChatStore, MessageEntry,
    MessageReceipt, Operation, Outcome, PeerLabelPolicy,
};

use crate::{
    error::GatewayError,
    events::ChatEvent,
    gateway_actor::{AddFriendRequest, ApplyOperation, CreateAccountRequest, SendMessageRequest},
};

/// Actor that owns the write path to the chat store.
#[derive(Actor)]
pub struct ChatGateway {
    store: Arc<LocalChatStore>,
    events: broadcast::Sender<ChatEvent>,
}

impl ChatGateway {
    pub fn new(store: Arc<LocalChatStore>, events: broadcast::Sender<ChatEvent>) -> Self {
        Self { store, events }
    }

    /// Apply one operation and publish its notification.
    pub(crate) async fn execute(
        &self,
        caller: Address,
        operation: Operation,
    ) -> Result<Outcome, GatewayError> {
        let outcome = self.store.apply(caller, operation).await?;
        let event = ChatEvent::from(&outcome);
        debug!("Publishing {event}");
        // No subscribers is not an error
        let _ = self.events.send(event);
        Ok(outcome)
    }
}

/// Typed client of the gateway, cheap to clone and share between tasks.
#[derive(Clone)]
pub struct GatewayHandle {
    actor: ActorRef<ChatGateway>,
    store: Arc<LocalChatStore>,
    events: broadcast::Sender<ChatEvent>,
}

impl GatewayHandle {
    /// Spawn the gateway actor over `store`. Must be called inside a Tokio runtime.
    pub fn spawn(store: Arc<LocalChatStore>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        let actor = kameo::spawn(ChatGateway::new(store.clone(), events.clone()));
        info!("Chat gateway started");
        Self {
            actor,
            store,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Peer-label policy the store was created with.
    pub async fn policy(&self) -> PeerLabelPolicy {
        self.store.policy().await
    }

    pub async fn create_account(
        &self,
        caller: Address,
        display_name: &str,
    ) -> Result<(), GatewayError> {
        flatten(
            self.actor
                .ask(CreateAccountRequest {
                    caller,
                    display_name: display_name.to_string(),
                })
                .await,
        )
    }

    pub async fn add_friend(
        &self,
        caller: Address,
        peer: Address,
        label: &str,
    ) -> Result<(), GatewayError> {
        flatten(
            self.actor
                .ask(AddFriendRequest {
                    caller,
                    peer,
                    label: label.to_string(),
                })
                .await,
        )
    }

    pub async fn send_message(
        &self,
        caller: Address,
        peer: Address,
        content: &str,
    ) -> Result<MessageReceipt, GatewayError> {
        flatten(
            self.actor
                .ask(SendMessageRequest {
                    caller,
                    peer,
                    content: content.to_string(),
                })
                .await,
        )
    }

    pub async fn apply(
        &self,
        caller: Address,
        operation: Operation,
    ) -> Result<Outcome, GatewayError> {
        flatten(self.actor.ask(ApplyOperation { caller, operation }).await)
    }

    pub async fn get_username(&self, identity: Address) -> Result<String, GatewayError> {
        Ok(self.store.get_username(identity).await?)
    }

    pub async fn user_exists(&self, identity: Address) -> bool {
        self.store.user_exists(identity).await
    }

    pub async fn get_friend_list(&self, identity: Address) -> Vec<FriendEntry> {
        self.store.get_friend_list(identity).await
    }

    pub async fn read_messages(&self, requester: Address, other: Address) -> Vec<MessageEntry> {
        self.store.read_messages(requester, other).await
    }

    pub async fn read_conversation(
        &self,
        caller: Address,
        a: Address,
        b: Address,
    ) -> Result<Vec<MessageEntry>, GatewayError> {
        Ok(self.store.read_conversation(caller, a, b).await?)
    }

    pub async fn list_all_accounts(&self) -> DirectorySnapshot {
        self.store.list_all_accounts().await
    }

    pub async fn list_all_users(&self) -> Vec<Account> {
        self.store.list_all_users().await
    }

    /// Stop the actor. Requests sent afterwards fail with
    /// [`GatewayError::ActorUnavailable`].
    pub async fn shutdown(&self) {
        if self.actor.stop_gracefully().await.is_ok() {
            self.actor.wait_for_stop().await;
        }
        info!("Chat gateway stopped");
    }
}

fn flatten<M, T>(res: Result<T, SendError<M, GatewayError>>) -> Result<T, GatewayError> {
    match res {
        Ok(value) => Ok(value),
        Err(SendError::HandlerError(err)) => Err(err),
        Err(_) => Err(GatewayError::ActorUnavailable),
    }
}
