//! Discord adapter

pub mod commands;

use async_trait::async_trait;
use serenity::all::{
    Cache, Channel, ChannelId, Client, CommandInteraction, CommandType, ComponentInteraction,
    Context, CreateAttachment, CreateInteractionResponse, CreateInteractionResponseMessage,
    CreateMessage, EventHandler, GatewayIntents, GuildId, Http, Interaction as DiscordInteraction,
    Member, ModalInteraction, Ready,
};
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::services::{CommandService, WelcomeService};
use crate::domain::entities::{Interaction, InteractionKind, MemberJoinEvent, OutgoingMessage};
use crate::domain::traits::{Bot, InteractionResponder};
use crate::infrastructure::compositor::WelcomeCompositor;

/// Discord JSON error code for "Interaction has already been acknowledged"
const ALREADY_ACKNOWLEDGED: isize = 40060;

/// Outbound side of the Discord gateway session
pub struct DiscordBot {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl DiscordBot {
    pub fn from_context(ctx: &Context) -> Self {
        Self {
            http: Arc::clone(&ctx.http),
            cache: Arc::clone(&ctx.cache),
        }
    }
}

#[async_trait]
impl Bot for DiscordBot {
    async fn send_message(&self, channel_id: u64, message: OutgoingMessage) -> Result<u64, BotError> {
        let mut builder = CreateMessage::new().content(message.content);
        if let Some(image) = message.attachment {
            builder = builder.add_file(CreateAttachment::bytes(image.bytes, image.filename));
        }

        let sent = ChannelId::new(channel_id)
            .send_message(&self.http, builder)
            .await
            .map_err(|e| BotError::Discord(e.to_string()))?;

        Ok(sent.id.get())
    }

    async fn guild_channel(&self, guild_id: u64, channel_id: u64) -> bool {
        let channel = ChannelId::new(channel_id);
        let cached = self.cache
            .guild(GuildId::new(guild_id))
            .map(|guild| guild.channels.contains_key(&channel));
        if cached == Some(true) {
            return true;
        }

        match channel.to_channel(&self.http).await {
            Ok(Channel::Guild(channel)) => channel.guild_id.get() == guild_id,
            Ok(_) => false,
            Err(e) => {
                tracing::debug!("Failed to fetch channel {}: {}", channel_id, e);
                false
            }
        }
    }

    async fn system_channel(&self, guild_id: u64) -> Option<u64> {
        let guild_id = GuildId::new(guild_id);
        let cached = self.cache.guild(guild_id).map(|guild| guild.system_channel_id);
        if let Some(channel) = cached {
            return channel.map(|c| c.get());
        }

        match guild_id.to_partial_guild(&self.http).await {
            Ok(guild) => guild.system_channel_id.map(|c| c.get()),
            Err(e) => {
                tracing::warn!("Failed to fetch guild {}: {}", guild_id, e);
                None
            }
        }
    }
}

/// Interaction types that accept a message response
enum ResponseTarget {
    Command(CommandInteraction),
    Component(ComponentInteraction),
    Modal(ModalInteraction),
}

/// Reply backend for one Discord interaction
pub struct DiscordResponder {
    http: Arc<Http>,
    target: ResponseTarget,
}

#[async_trait]
impl InteractionResponder for DiscordResponder {
    async fn respond(&self, text: &str) -> Result<(), BotError> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new().content(text),
        );

        let result = match &self.target {
            ResponseTarget::Command(i) => i.create_response(&self.http, response).await,
            ResponseTarget::Component(i) => i.create_response(&self.http, response).await,
            ResponseTarget::Modal(i) => i.create_response(&self.http, response).await,
        };

        result.map_err(response_error)
    }
}

fn response_error(e: serenity::Error) -> BotError {
    if let serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(ref response)) = e {
        if response.error.code == ALREADY_ACKNOWLEDGED {
            return BotError::AlreadyReplied;
        }
    }
    BotError::Discord(e.to_string())
}

/// Translate a gateway interaction into the domain type.
///
/// Pings carry no reply channel and are dropped here.
fn to_domain(http: &Arc<Http>, interaction: DiscordInteraction) -> Option<Interaction> {
    let (kind, name, user_id, guild_id, target) = match interaction {
        DiscordInteraction::Command(cmd) => {
            let kind = if cmd.data.kind == CommandType::ChatInput {
                InteractionKind::ChatInputCommand
            } else {
                InteractionKind::ContextMenuCommand
            };
            (kind, cmd.data.name.clone(), cmd.user.id, cmd.guild_id, ResponseTarget::Command(cmd))
        }
        DiscordInteraction::Autocomplete(cmd) => (
            InteractionKind::Autocomplete,
            cmd.data.name.clone(),
            cmd.user.id,
            cmd.guild_id,
            ResponseTarget::Command(cmd),
        ),
        DiscordInteraction::Component(c) => (
            InteractionKind::Component,
            c.data.custom_id.clone(),
            c.user.id,
            c.guild_id,
            ResponseTarget::Component(c),
        ),
        DiscordInteraction::Modal(m) => (
            InteractionKind::Modal,
            m.data.custom_id.clone(),
            m.user.id,
            m.guild_id,
            ResponseTarget::Modal(m),
        ),
        _ => return None,
    };

    let responder = DiscordResponder {
        http: Arc::clone(http),
        target,
    };
    Some(
        Interaction::new(kind, name, responder)
            .with_user(user_id.get())
            .with_guild(guild_id.map(|g| g.get())),
    )
}

fn join_event(member: &Member) -> MemberJoinEvent {
    let event = MemberJoinEvent::new(
        member.guild_id.get(),
        member.user.id.get(),
        member.user.name.clone(),
        member.face(),
    );
    match member.joined_at.and_then(|t| chrono::DateTime::from_timestamp(t.unix_timestamp(), 0)) {
        Some(joined_at) => event.with_joined_at(joined_at),
        None => event,
    }
}

/// Discord bot event handler
pub struct Handler {
    welcome: WelcomeService<WelcomeCompositor>,
    commands: CommandService,
}

impl Handler {
    pub fn new(welcome: WelcomeService<WelcomeCompositor>, commands: CommandService) -> Self {
        Self { welcome, commands }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("{} is connected to Discord!", ready.user.name);
    }

    /// Called when a member joins a guild
    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let event = join_event(&new_member);
        let bot = DiscordBot::from_context(&ctx);

        match self.welcome.handle_join(&bot, &event).await {
            Ok(outcome) => tracing::debug!(?outcome, "Join handled for {}", event),
            Err(e) => tracing::error!("Failed to welcome {}: {}", event, e),
        }
    }

    /// Called for every interaction; the router decides what to answer
    async fn interaction_create(&self, ctx: Context, interaction: DiscordInteraction) {
        let Some(interaction) = to_domain(&ctx.http, interaction) else {
            return;
        };
        let outcome = self.commands.handle(interaction).await;
        tracing::debug!(?outcome, "Interaction handled");
    }
}

/// Connect to the gateway and dispatch events until the connection closes
pub async fn run(token: &str, handler: Handler) -> Result<(), BotError> {
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| BotError::Discord(format!("Failed to create Discord client: {}", e)))?;

    client
        .start()
        .await
        .map_err(|e| BotError::Discord(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_http_errors_stay_discord_errors() {
        let err = response_error(serenity::Error::Other("gateway closed"));
        assert!(matches!(err, BotError::Discord(_)));
    }
}
