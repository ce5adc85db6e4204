use async_trait::async_trait;
use crate::application::errors::BotError;

/// Platform side of an interaction reply
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Send the reply text.
    ///
    /// Returns `BotError::AlreadyReplied` when the platform reports the
    /// interaction was already acknowledged.
    async fn respond(&self, text: &str) -> Result<(), BotError>;
}
