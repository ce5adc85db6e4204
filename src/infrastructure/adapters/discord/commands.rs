//! Slash command registration

use serenity::all::{ApplicationId, CreateCommand, GuildId, Http};

use crate::application::errors::BotError;
use crate::domain::entities::CommandRegistry;

/// Build Discord command definitions from the dispatch table
pub fn build_commands(registry: &CommandRegistry) -> Vec<CreateCommand> {
    registry
        .all()
        .map(|cmd| CreateCommand::new(&cmd.name).description(&cmd.description))
        .collect()
}

/// Replace the guild's slash commands with the registry's, returning how many were registered
pub async fn deploy_commands(
    token: &str,
    application_id: u64,
    guild_id: u64,
    registry: &CommandRegistry,
) -> Result<usize, BotError> {
    let http = Http::new(token);
    http.set_application_id(ApplicationId::new(application_id));

    tracing::info!(guild = guild_id, count = registry.len(), "Registering slash commands with Discord");

    let registered = GuildId::new(guild_id)
        .set_commands(&http, build_commands(registry))
        .await
        .map_err(|e| BotError::Discord(format!("Failed to register commands: {}", e)))?;

    tracing::info!("Slash command registration complete");
    Ok(registered.len())
}
