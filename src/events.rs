use std::fmt::Display;

use alloy::primitives::{Address, B256};
use chat_store::Outcome;
use serde::Serialize;

/// Change notification published after an operation commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChatEvent {
    AccountCreated {
        owner: Address,
        display_name: String,
    },
    FriendAdded {
        owner: Address,
        peer: Address,
    },
    MessageSent {
        chat_code: B256,
        sender: Address,
        recipient: Address,
        index: usize,
    },
}

impl From<&Outcome> for ChatEvent {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::AccountCreated {
                owner,
                display_name,
            } => ChatEvent::AccountCreated {
                owner: *owner,
                display_name: display_name.clone(),
            },
            Outcome::FriendAdded { owner, peer } => ChatEvent::FriendAdded {
                owner: *owner,
                peer: *peer,
            },
            Outcome::MessageSent {
                sender,
                recipient,
                receipt,
            } => ChatEvent::MessageSent {
                chat_code: receipt.chat_code,
                sender: *sender,
                recipient: *recipient,
                index: receipt.index,
            },
        }
    }
}

impl Display for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatEvent::AccountCreated { owner, .. } => write!(f, "AccountCreated({owner})"),
            ChatEvent::FriendAdded { owner, peer } => write!(f, "FriendAdded({owner}, {peer})"),
            ChatEvent::MessageSent {
                chat_code, index, ..
            } => write!(f, "MessageSent({chat_code}#{index})"),
        }
    }
}
