use std::path::PathBuf;

use crate::domain::entities::welcome::welcome_caption;
use crate::domain::entities::{Composition, MemberJoinEvent, OutgoingMessage, WelcomeImageSpec};
use crate::domain::traits::{Bot, ImageCompositor};
use crate::application::errors::BotError;

/// Where and how welcome cards are posted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WelcomeSettings {
    pub channel_id: Option<u64>,
    pub background: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeOutcome {
    /// Guild has no usable welcome channel
    NoChannel,
    SentText,
    SentWithImage,
}

/// Message text for a join, independent of the image outcome
pub fn welcome_text(event: &MemberJoinEvent) -> String {
    format!("Welcome, {}!", event.mention())
}

/// Posts a welcome message when a member joins a guild
pub struct WelcomeService<C: ImageCompositor> {
    compositor: C,
    settings: WelcomeSettings,
}

impl<C: ImageCompositor> WelcomeService<C> {
    pub fn new(compositor: C, settings: WelcomeSettings) -> Self {
        Self { compositor, settings }
    }

    /// Configured channel if it lives in the guild, else the guild's system channel
    pub async fn resolve_channel<B: Bot + ?Sized>(&self, bot: &B, guild_id: u64) -> Option<u64> {
        if let Some(channel_id) = self.settings.channel_id {
            if bot.guild_channel(guild_id, channel_id).await {
                return Some(channel_id);
            }
            tracing::debug!(guild = guild_id, channel = channel_id, "Configured welcome channel not in guild");
        }
        bot.system_channel(guild_id).await
    }

    /// Welcome one member.
    ///
    /// An avatar failure aborts the whole notification: nothing is sent.
    pub async fn handle_join<B: Bot + ?Sized>(
        &self,
        bot: &B,
        event: &MemberJoinEvent,
    ) -> Result<WelcomeOutcome, BotError> {
        let Some(channel_id) = self.resolve_channel(bot, event.guild_id).await else {
            tracing::debug!("No welcome channel for {}", event);
            return Ok(WelcomeOutcome::NoChannel);
        };

        let spec = WelcomeImageSpec::new(&event.avatar_url, welcome_caption(&event.username))
            .with_background(self.settings.background.clone());

        let message = match self.compositor.compose(&spec).await? {
            Composition::Rendered(image) => OutgoingMessage::text(welcome_text(event)).with_attachment(image),
            Composition::Unavailable => OutgoingMessage::text(welcome_text(event)),
        };
        let outcome = if message.attachment.is_some() {
            WelcomeOutcome::SentWithImage
        } else {
            WelcomeOutcome::SentText
        };

        bot.send_message(channel_id, message).await?;
        tracing::info!(channel = channel_id, joined_at = %event.joined_at, "Welcomed {}", event);

        Ok(outcome)
    }
}
