use alloy::primitives::Address;
use chrono::Utc;
use log::info;
use tokio::sync::RwLock;

use crate::{
    Account, ChatState, ChatStoreError, ChatStoreService, DirectorySnapshot, FriendEntry,
    MessageEntry, MessageReceipt, Operation, Outcome, PeerLabelPolicy,
};

/// In-memory chat store.
///
/// Mutations hold the write lock across validation and commit, so they are
/// applied one at a time. Queries share the read lock and observe either the
/// state before a mutation or the state after it.
#[derive(Debug, Default)]
pub struct LocalChatStore {
    state: RwLock<ChatState>,
}

impl LocalChatStore {
    pub fn new() -> Self {
        LocalChatStore::default()
    }

    pub fn with_policy(policy: PeerLabelPolicy) -> Self {
        LocalChatStore {
            state: RwLock::new(ChatState::new(policy)),
        }
    }

    pub async fn policy(&self) -> PeerLabelPolicy {
        self.state.read().await.policy()
    }

    async fn commit(
        &self,
        caller: Address,
        operation: Operation,
    ) -> Result<Outcome, ChatStoreError> {
        let mut state = self.state.write().await;
        let timestamp = now_unix();
        let outcome = state.apply(caller, operation, timestamp)?;
        log_commit(&state, &outcome);
        Ok(outcome)
    }
}

fn log_commit(state: &ChatState, outcome: &Outcome) {
    match outcome {
        Outcome::AccountCreated { owner, .. } => {
            info!("Account created for {owner}, {} registered", state.directory().len())
        }
        Outcome::FriendAdded { owner, peer } => info!("{owner} and {peer} are now friends"),
        Outcome::MessageSent {
            sender,
            recipient,
            receipt,
        } => info!("Message #{} from {sender} to {recipient} stored", receipt.index),
    }
}

fn now_unix() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

impl ChatStoreService for LocalChatStore {
    async fn create_account(
        &self,
        caller: Address,
        display_name: &str,
    ) -> Result<(), ChatStoreError> {
        self.commit(
            caller,
            Operation::CreateAccount {
                display_name: display_name.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    async fn get_username(&self, identity: Address) -> Result<String, ChatStoreError> {
        let state = self.state.read().await;
        state.username(&identity).map(str::to_string)
    }

    async fn user_exists(&self, identity: Address) -> bool {
        self.state.read().await.registry().contains(&identity)
    }

    async fn add_friend(
        &self,
        caller: Address,
        peer: Address,
        label: &str,
    ) -> Result<(), ChatStoreError> {
        self.commit(
            caller,
            Operation::AddFriend {
                peer,
                label: label.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    async fn get_friend_list(&self, identity: Address) -> Vec<FriendEntry> {
        self.state.read().await.friend_list(&identity).to_vec()
    }

    async fn are_friends(&self, a: Address, b: Address) -> bool {
        self.state.read().await.friends().are_friends(&a, &b)
    }

    async fn send_message(
        &self,
        caller: Address,
        peer: Address,
        content: &str,
    ) -> Result<MessageReceipt, ChatStoreError> {
        let mut state = self.state.write().await;
        let timestamp = now_unix();
        let receipt = state.send_message(caller, peer, content.to_string(), timestamp)?;
        log_commit(
            &state,
            &Outcome::MessageSent {
                sender: caller,
                recipient: peer,
                receipt,
            },
        );
        Ok(receipt)
    }

    async fn read_messages(&self, requester: Address, other: Address) -> Vec<MessageEntry> {
        self.state.read().await.messages(&requester, &other).to_vec()
    }

    async fn read_conversation(
        &self,
        caller: Address,
        a: Address,
        b: Address,
    ) -> Result<Vec<MessageEntry>, ChatStoreError> {
        let state = self.state.read().await;
        state.conversation(&caller, &a, &b).map(<[MessageEntry]>::to_vec)
    }

    async fn list_all_accounts(&self) -> DirectorySnapshot {
        self.state.read().await.all_accounts()
    }

    async fn list_all_users(&self) -> Vec<Account> {
        self.state.read().await.all_users()
    }

    async fn apply(
        &self,
        caller: Address,
        operation: Operation,
    ) -> Result<Outcome, ChatStoreError> {
        self.commit(caller, operation).await
    }

    async fn snapshot(&self) -> ChatState {
        self.state.read().await.clone()
    }
}
