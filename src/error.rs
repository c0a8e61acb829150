use alloy::hex::FromHexError;
use chat_store::{ChatStoreError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    ChatStoreError(#[from] ChatStoreError),

    #[error("Gateway actor is not running")]
    ActorUnavailable,
    #[error("Unexpected outcome: {0}")]
    UnexpectedOutcome(String),

    #[error("Missing caller address header")]
    MissingCallerError,
    #[error("Failed to parse address: {0}")]
    AddressParsingError(#[from] FromHexError),
}

impl GatewayError {
    /// Taxonomy of the failure, `None` when the gateway itself failed.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            GatewayError::ChatStoreError(err) => Some(err.kind()),
            GatewayError::MissingCallerError | GatewayError::AddressParsingError(_) => {
                Some(ErrorKind::InvalidInput)
            }
            GatewayError::ActorUnavailable | GatewayError::UnexpectedOutcome(_) => None,
        }
    }
}
