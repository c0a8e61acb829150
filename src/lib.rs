pub mod bootstrap;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod gateway_actor;
pub mod server;

pub use chat_store;

pub use error::GatewayError;
pub use events::ChatEvent;
pub use gateway::{ChatGateway, GatewayHandle};
