use std::sync::Arc;

use log::info;
use tokio_util::sync::CancellationToken;

use chat_store::LocalChatStore;

use crate::{config::DirectoryConfig, gateway::GatewayHandle};

pub struct Bootstrap {
    pub gateway: GatewayHandle,
    /// Cancelled to stop the server and anything else tied to this instance
    pub cancel: CancellationToken,
}

/// Instantiate one chat store and the gateway in front of it. Must be called
/// inside a Tokio runtime.
pub fn bootstrap_directory(cfg: &DirectoryConfig) -> Bootstrap {
    let store = Arc::new(LocalChatStore::with_policy(cfg.peer_label_policy));
    let gateway = GatewayHandle::spawn(store, cfg.event_capacity);
    info!(
        "Chat directory instantiated (peer labels: {:?}, event capacity: {})",
        cfg.peer_label_policy, cfg.event_capacity
    );
    Bootstrap {
        gateway,
        cancel: CancellationToken::new(),
    }
}
