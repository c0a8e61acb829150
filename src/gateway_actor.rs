use alloy::primitives::Address;
use kameo::message::{Context, Message};

use chat_store::{MessageReceipt, Operation, Outcome};

use crate::{error::GatewayError, gateway::ChatGateway};

pub struct CreateAccountRequest {
    pub caller: Address,
    pub display_name: String,
}

impl Message<CreateAccountRequest> for ChatGateway {
    type Reply = Result<(), GatewayError>;

    async fn handle(
        &mut self,
        msg: CreateAccountRequest,
        _ctx: Context<'_, Self, Self::Reply>,
    ) -> Self::Reply {
        self.execute(
            msg.caller,
            Operation::CreateAccount {
                display_name: msg.display_name,
            },
        )
        .await?;
        Ok(())
    }
}

pub struct AddFriendRequest {
    pub caller: Address,
    pub peer: Address,
    pub label: String,
}

impl Message<AddFriendRequest> for ChatGateway {
    type Reply = Result<(), GatewayError>;

    async fn handle(
        &mut self,
        msg: AddFriendRequest,
        _ctx: Context<'_, Self, Self::Reply>,
    ) -> Self::Reply {
        self.execute(
            msg.caller,
            Operation::AddFriend {
                peer: msg.peer,
                label: msg.label,
            },
        )
        .await?;
        Ok(())
    }
}

pub struct SendMessageRequest {
    pub caller: Address,
    pub peer: Address,
    pub content: String,
}

impl Message<SendMessageRequest> for ChatGateway {
    type Reply = Result<MessageReceipt, GatewayError>;

    async fn handle(
        &mut self,
        msg: SendMessageRequest,
        _ctx: Context<'_, Self, Self::Reply>,
    ) -> Self::Reply {
        let outcome = self
            .execute(
                msg.caller,
                Operation::SendMessage {
                    peer: msg.peer,
                    content: msg.content,
                },
            )
            .await?;
        match outcome {
            Outcome::MessageSent { receipt, .. } => Ok(receipt),
            other => Err(GatewayError::UnexpectedOutcome(other.to_string())),
        }
    }
}

/// Generic form of the three requests above, for callers that already hold an
/// [`Operation`].
pub struct ApplyOperation {
    pub caller: Address,
    pub operation: Operation,
}

impl Message<ApplyOperation> for ChatGateway {
    type Reply = Result<Outcome, GatewayError>;

    async fn handle(
        &mut self,
        msg: ApplyOperation,
        _ctx: Context<'_, Self, Self::Reply>,
    ) -> Self::Reply {
        self.execute(msg.caller, msg.operation).await
    }
}
