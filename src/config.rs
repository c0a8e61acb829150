use std::net::SocketAddr;

use chat_store::PeerLabelPolicy;
use clap::Parser;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP server listens on
    #[arg(short = 'B', long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: SocketAddr,

    /// Buffered change notifications per subscriber
    #[arg(short = 'E', long, env = "EVENT_CAPACITY", default_value_t = DEFAULT_EVENT_CAPACITY)]
    pub event_capacity: usize,

    /// Label stored on the peer side of a new friendship: `shared` or `display_name`
    #[arg(short = 'P', long, env = "PEER_LABEL_POLICY", default_value = "shared")]
    pub peer_label_policy: PeerLabelPolicy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectoryConfig {
    pub bind_addr: SocketAddr,
    pub event_capacity: usize,
    pub peer_label_policy: PeerLabelPolicy,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            peer_label_policy: PeerLabelPolicy::default(),
        }
    }
}

impl From<Args> for DirectoryConfig {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: args.bind_addr,
            event_capacity: args.event_capacity,
            peer_label_policy: args.peer_label_policy,
        }
    }
}
