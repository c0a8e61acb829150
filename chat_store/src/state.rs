//! Transition function of the chat directory.
//!
//! Every transition runs in two steps:
//!
//! ```text
//! check_new_*(&self, ..)    reads only, may fail
//! insert / link / append    writes only, cannot fail
//! ```
//!
//! A rejected operation therefore never reaches a write and leaves every
//! store exactly as it was.

use std::fmt::Display;

use alloy::primitives::Address;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    directory::{Directory, DirectorySnapshot},
    friends::FriendGraph,
    ledger::Ledger,
    registry::Registry,
    Account, ChatStoreError, FriendEntry, MessageEntry, MessageReceipt, PairKey, PeerLabelPolicy,
};

/// A mutating request, issued on behalf of a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateAccount { display_name: String },
    AddFriend { peer: Address, label: String },
    SendMessage { peer: Address, content: String },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateAccount { .. } => "create_account",
            Operation::AddFriend { .. } => "add_friend",
            Operation::SendMessage { .. } => "send_message",
        }
    }
}

/// Result of a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    AccountCreated { owner: Address, display_name: String },
    FriendAdded { owner: Address, peer: Address },
    MessageSent {
        sender: Address,
        recipient: Address,
        receipt: MessageReceipt,
    },
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::AccountCreated { owner, .. } => write!(f, "AccountCreated({owner})"),
            Outcome::FriendAdded { owner, peer } => write!(f, "FriendAdded({owner}, {peer})"),
            Outcome::MessageSent { receipt, .. } => write!(f, "MessageSent(#{})", receipt.index),
        }
    }
}

/// Registry, friend graph, ledger and directory as one value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    policy: PeerLabelPolicy,
    registry: Registry,
    friends: FriendGraph,
    ledger: Ledger,
    directory: Directory,
}

impl ChatState {
    pub fn new(policy: PeerLabelPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> PeerLabelPolicy {
        self.policy
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn friends(&self) -> &FriendGraph {
        &self.friends
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn username(&self, identity: &Address) -> Result<&str, ChatStoreError> {
        self.registry.username(identity)
    }

    pub fn friend_list(&self, identity: &Address) -> &[FriendEntry] {
        self.friends.friends_of(identity)
    }

    pub fn messages(&self, a: &Address, b: &Address) -> &[MessageEntry] {
        self.ledger.log(&PairKey::new(*a, *b))
    }

    pub fn conversation(
        &self,
        caller: &Address,
        a: &Address,
        b: &Address,
    ) -> Result<&[MessageEntry], ChatStoreError> {
        if caller != a && caller != b {
            return Err(ChatStoreError::NotParticipantError(*caller));
        }
        Ok(self.messages(a, b))
    }

    pub fn all_accounts(&self) -> DirectorySnapshot {
        self.directory.snapshot()
    }

    pub fn all_users(&self) -> Vec<Account> {
        self.directory
            .snapshot()
            .iter()
            .filter_map(|address| self.registry.get(address).cloned())
            .collect()
    }

    /// Validate `operation` for `caller` and commit it. `timestamp` stamps the
    /// message entry of a `SendMessage`.
    pub fn apply(
        &mut self,
        caller: Address,
        operation: Operation,
        timestamp: u64,
    ) -> Result<Outcome, ChatStoreError> {
        match operation {
            Operation::CreateAccount { display_name } => self
                .create_account(caller, display_name)
                .map(|display_name| Outcome::AccountCreated {
                    owner: caller,
                    display_name,
                }),
            Operation::AddFriend { peer, label } => self
                .add_friend(caller, peer, label)
                .map(|_| Outcome::FriendAdded {
                    owner: caller,
                    peer,
                }),
            Operation::SendMessage { peer, content } => self
                .send_message(caller, peer, content, timestamp)
                .map(|receipt| Outcome::MessageSent {
                    sender: caller,
                    recipient: peer,
                    receipt,
                }),
        }
    }

    /// Returns the stored display name.
    pub fn create_account(
        &mut self,
        caller: Address,
        display_name: String,
    ) -> Result<String, ChatStoreError> {
        self.registry
            .check_new_account(&caller, &display_name)
            .inspect_err(|err| rejected("create_account", &caller, err))?;

        self.registry.insert(Account {
            owner: caller,
            display_name: display_name.clone(),
        });
        self.directory.push(caller);
        debug!("Registered {caller} as {display_name:?}");
        Ok(display_name)
    }

    pub fn add_friend(
        &mut self,
        caller: Address,
        peer: Address,
        label: String,
    ) -> Result<(), ChatStoreError> {
        self.friends
            .check_new_friendship(&self.registry, &caller, &peer)
            .inspect_err(|err| rejected("add_friend", &caller, err))?;
        let peer_label = match self.policy {
            PeerLabelPolicy::SharedLabel => label.clone(),
            PeerLabelPolicy::CallerDisplayName => self.registry.username(&caller)?.to_string(),
        };

        self.friends.link(caller, peer, label, peer_label);
        debug!("Linked {caller} and {peer}");
        Ok(())
    }

    pub fn send_message(
        &mut self,
        caller: Address,
        peer: Address,
        content: String,
        timestamp: u64,
    ) -> Result<MessageReceipt, ChatStoreError> {
        let key = self
            .ledger
            .check_new_message(&self.registry, &self.friends, &caller, &peer)
            .inspect_err(|err| rejected("send_message", &caller, err))?;

        let receipt = self.ledger.append(
            key,
            MessageEntry {
                sender: caller,
                timestamp,
                content,
            },
        );
        debug!("Appended message #{} to {key}", receipt.index);
        Ok(receipt)
    }
}

fn rejected(op_name: &str, caller: &Address, err: &ChatStoreError) {
    debug!("Rejected {op_name} from {caller}: {err}");
}
