//! Account registry, friend graph and per-pair message ledger behind the chat
//! directory.
//!
//! All mutations enter through [`ChatState::apply`], which validates an
//! [`Operation`] against the current state before touching any store.
//! [`LocalChatStore`] wraps the state behind a lock and implements
//! [`ChatStoreService`], the surface the gateway is written against.

pub mod directory;
pub mod friends;
pub mod ledger;
pub mod local_store;
pub mod registry;
pub mod state;
pub mod types;

use std::{fmt::Display, future::Future};

use alloy::primitives::Address;
use serde::Serialize;

pub use directory::DirectorySnapshot;
pub use local_store::LocalChatStore;
pub use state::{ChatState, Operation, Outcome};
pub use types::{Account, FriendEntry, MessageEntry, MessageReceipt, PairKey, PeerLabelPolicy};

pub trait ChatStoreService {
    fn create_account(
        &self,
        caller: Address,
        display_name: &str,
    ) -> impl Future<Output = Result<(), ChatStoreError>> + Send;
    fn get_username(
        &self,
        identity: Address,
    ) -> impl Future<Output = Result<String, ChatStoreError>> + Send;
    fn user_exists(&self, identity: Address) -> impl Future<Output = bool> + Send;
    fn add_friend(
        &self,
        caller: Address,
        peer: Address,
        label: &str,
    ) -> impl Future<Output = Result<(), ChatStoreError>> + Send;
    fn get_friend_list(&self, identity: Address) -> impl Future<Output = Vec<FriendEntry>> + Send;
    fn are_friends(&self, a: Address, b: Address) -> impl Future<Output = bool> + Send;
    fn send_message(
        &self,
        caller: Address,
        peer: Address,
        content: &str,
    ) -> impl Future<Output = Result<MessageReceipt, ChatStoreError>> + Send;
    fn read_messages(
        &self,
        requester: Address,
        other: Address,
    ) -> impl Future<Output = Vec<MessageEntry>> + Send;
    fn read_conversation(
        &self,
        caller: Address,
        a: Address,
        b: Address,
    ) -> impl Future<Output = Result<Vec<MessageEntry>, ChatStoreError>> + Send;
    fn list_all_accounts(&self) -> impl Future<Output = DirectorySnapshot> + Send;
    fn list_all_users(&self) -> impl Future<Output = Vec<Account>> + Send;
    fn apply(
        &self,
        caller: Address,
        operation: Operation,
    ) -> impl Future<Output = Result<Outcome, ChatStoreError>> + Send;
    fn snapshot(&self) -> impl Future<Output = ChatState> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatStoreError {
    #[error("Username cannot be empty")]
    EmptyUsernameError,
    #[error("User Already Exists: {0}")]
    AlreadyExistedUserError(Address),
    #[error("User is not registered: {0}")]
    UnknownUserError(Address),
    #[error("Cannot add yourself as a friend")]
    SelfFriendshipError,
    #[error("Create account first: {0}")]
    UnregisteredCallerError(Address),
    #[error("Friend user is not registered: {0}")]
    UnregisteredPeerError(Address),
    #[error("These users are already friends")]
    AlreadyFriendsError,
    #[error("Cannot send message to yourself")]
    SelfMessageError,
    #[error("You are not friend with given user")]
    NotFriendsError,
    #[error("Only participants can read this conversation: {0}")]
    NotParticipantError(Address),
}

impl ChatStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatStoreError::EmptyUsernameError
            | ChatStoreError::SelfFriendshipError
            | ChatStoreError::SelfMessageError => ErrorKind::InvalidInput,
            ChatStoreError::AlreadyExistedUserError(_) | ChatStoreError::AlreadyFriendsError => {
                ErrorKind::AlreadyExists
            }
            ChatStoreError::UnknownUserError(_) => ErrorKind::NotFound,
            ChatStoreError::UnregisteredCallerError(_) => {
                ErrorKind::PreconditionFailed(Precondition::CallerUnregistered)
            }
            ChatStoreError::UnregisteredPeerError(_) => {
                ErrorKind::PreconditionFailed(Precondition::PeerUnregistered)
            }
            ChatStoreError::NotFriendsError => {
                ErrorKind::PreconditionFailed(Precondition::NotFriends)
            }
            ChatStoreError::NotParticipantError(_) => ErrorKind::Forbidden,
        }
    }
}

/// Failure taxonomy shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    AlreadyExists,
    NotFound,
    PreconditionFailed(Precondition),
    Forbidden,
}

/// The relationship that was required but did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    CallerUnregistered,
    PeerUnregistered,
    NotFriends,
}

impl Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Precondition::CallerUnregistered => "caller unregistered",
            Precondition::PeerUnregistered => "peer unregistered",
            Precondition::NotFriends => "not friends",
        };
        write!(f, "{reason}")
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidInput => write!(f, "InvalidInput"),
            ErrorKind::AlreadyExists => write!(f, "AlreadyExists"),
            ErrorKind::NotFound => write!(f, "NotFound"),
            ErrorKind::PreconditionFailed(reason) => write!(f, "PreconditionFailed({reason})"),
            ErrorKind::Forbidden => write!(f, "Forbidden"),
        }
    }
}
