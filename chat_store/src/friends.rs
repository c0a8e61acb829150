use std::collections::{HashMap, HashSet};

use alloy::primitives::Address;

use crate::{registry::Registry, ChatStoreError, FriendEntry, PairKey};

/// Per-address friend lists plus the set of linked pairs.
///
/// Every pair in `pairs` has exactly one entry on each side's list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FriendGraph {
    lists: HashMap<Address, Vec<FriendEntry>>,
    pairs: HashSet<PairKey>,
}

impl FriendGraph {
    /// Friend list in insertion order, empty for an address that has none.
    pub fn friends_of(&self, address: &Address) -> &[FriendEntry] {
        self.lists.get(address).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn are_friends(&self, a: &Address, b: &Address) -> bool {
        self.pairs.contains(&PairKey::new(*a, *b))
    }

    pub fn friendships(&self) -> usize {
        self.pairs.len()
    }

    pub(crate) fn check_new_friendship(
        &self,
        registry: &Registry,
        caller: &Address,
        peer: &Address,
    ) -> Result<PairKey, ChatStoreError> {
        if caller == peer {
            return Err(ChatStoreError::SelfFriendshipError);
        }
        if !registry.contains(caller) {
            return Err(ChatStoreError::UnregisteredCallerError(*caller));
        }
        if !registry.contains(peer) {
            return Err(ChatStoreError::UnregisteredPeerError(*peer));
        }
        if self.friends_of(caller).iter().any(|f| f.peer == *peer) {
            return Err(ChatStoreError::AlreadyFriendsError);
        }
        Ok(PairKey::new(*caller, *peer))
    }

    /// Callers must have run [`FriendGraph::check_new_friendship`] first.
    pub(crate) fn link(
        &mut self,
        caller: Address,
        peer: Address,
        caller_label: String,
        peer_label: String,
    ) {
        self.lists.entry(caller).or_default().push(FriendEntry {
            peer,
            label: caller_label,
        });
        self.lists.entry(peer).or_default().push(FriendEntry {
            peer: caller,
            label: peer_label,
        });
        self.pairs.insert(PairKey::new(caller, peer));
    }
}
