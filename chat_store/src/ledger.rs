use std::collections::HashMap;

use alloy::primitives::Address;

use crate::{
    friends::FriendGraph, registry::Registry, ChatStoreError, MessageEntry, MessageReceipt,
    PairKey,
};

/// Append-only conversation logs, one per unordered pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    logs: HashMap<PairKey, Vec<MessageEntry>>,
}

impl Ledger {
    /// Log of the conversation, oldest first. Empty if nothing was sent yet.
    pub fn log(&self, key: &PairKey) -> &[MessageEntry] {
        self.logs.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn conversations(&self) -> usize {
        self.logs.len()
    }

    pub(crate) fn check_new_message(
        &self,
        registry: &Registry,
        friends: &FriendGraph,
        caller: &Address,
        peer: &Address,
    ) -> Result<PairKey, ChatStoreError> {
        if caller == peer {
            return Err(ChatStoreError::SelfMessageError);
        }
        if !registry.contains(caller) {
            return Err(ChatStoreError::UnregisteredCallerError(*caller));
        }
        if !registry.contains(peer) {
            return Err(ChatStoreError::UnregisteredPeerError(*peer));
        }
        if !friends.friends_of(caller).iter().any(|f| f.peer == *peer) {
            return Err(ChatStoreError::NotFriendsError);
        }
        Ok(PairKey::new(*caller, *peer))
    }

    /// Callers must have run [`Ledger::check_new_message`] first.
    pub(crate) fn append(&mut self, key: PairKey, entry: MessageEntry) -> MessageReceipt {
        let log = self.logs.entry(key).or_default();
        log.push(entry);
        MessageReceipt {
            chat_code: key.chat_code(),
            index: log.len() - 1,
        }
    }
}
