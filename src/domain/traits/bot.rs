use async_trait::async_trait;
use crate::domain::entities::OutgoingMessage;
use crate::application::errors::BotError;

/// Bot trait - abstraction for the chat platform's outbound side
#[async_trait]
pub trait Bot: Send + Sync {
    /// Send a message to a channel, returning the platform message id
    async fn send_message(&self, channel_id: u64, message: OutgoingMessage) -> Result<u64, BotError>;

    /// Whether `channel_id` exists and belongs to `guild_id`
    async fn guild_channel(&self, guild_id: u64, channel_id: u64) -> bool;

    /// The guild's system channel, if one is set
    async fn system_channel(&self, guild_id: u64) -> Option<u64>;
}
