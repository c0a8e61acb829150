use std::fmt::Display;

use alloy::primitives::{keccak256, Address, B256};
use serde::{Deserialize, Serialize};

/// Account record binding a wallet address to the name chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub owner: Address,
    pub display_name: String,
}

/// One entry of a user's friend list: the friend's address and the local label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEntry {
    pub peer: Address,
    pub label: String,
}

/// A single message of a conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub sender: Address,
    /// Unix seconds at the moment the message was committed
    pub timestamp: u64,
    pub content: String,
}

/// Position of a freshly appended message inside its conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub chat_code: B256,
    pub index: usize,
}

/// Canonical key of a conversation between two addresses.
///
/// The pair is stored sorted, so `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(Address, Address);

impl PairKey {
    pub fn new(a: Address, b: Address) -> Self {
        if a <= b {
            PairKey(a, b)
        } else {
            PairKey(b, a)
        }
    }

    pub fn low(&self) -> Address {
        self.0
    }

    pub fn high(&self) -> Address {
        self.1
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0 == *address || self.1 == *address
    }

    /// Conversation identifier: keccak256 over the packed bytes of the sorted pair.
    pub fn chat_code(&self) -> B256 {
        let mut packed = [0u8; 40];
        packed[..20].copy_from_slice(self.0.as_slice());
        packed[20..].copy_from_slice(self.1.as_slice());
        keccak256(packed)
    }
}

impl Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<->{}", self.0, self.1)
    }
}

/// How the peer side of a new friendship is labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerLabelPolicy {
    /// Both entries carry the label supplied by the caller
    #[default]
    SharedLabel,
    /// The peer's entry carries the caller's display name
    CallerDisplayName,
}

impl std::str::FromStr for PeerLabelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shared" | "shared_label" => Ok(PeerLabelPolicy::SharedLabel),
            "display_name" | "caller_display_name" => Ok(PeerLabelPolicy::CallerDisplayName),
            other => Err(format!("unknown peer label policy: {other}")),
        }
    }
}
