//! Slash command interactions and their single-use reply capability

use crate::application::errors::BotError;
use crate::domain::traits::InteractionResponder;

/// Interaction types delivered by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    ChatInputCommand,
    ContextMenuCommand,
    Autocomplete,
    Component,
    Modal,
}

/// Whether the reply capability has been spent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    Unused,
    Used,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Sent,
    /// Capability was already spent; nothing was sent
    AlreadyReplied,
}

/// Right to send exactly one terminal reply to an interaction.
///
/// Replies after the first successful one are checked no-ops. A platform
/// report of "already acknowledged" also spends the capability.
pub struct ReplyCapability {
    responder: Box<dyn InteractionResponder>,
    state: ReplyState,
}

impl ReplyCapability {
    pub fn new(responder: impl InteractionResponder + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            state: ReplyState::Unused,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ReplyState {
        self.state
    }

    pub fn is_used(&self) -> bool {
        self.state == ReplyState::Used
    }

    pub async fn reply(&mut self, text: &str) -> Result<ReplyOutcome, BotError> {
        if self.is_used() {
            return Ok(ReplyOutcome::AlreadyReplied);
        }

        match self.responder.respond(text).await {
            Ok(()) => {
                self.state = ReplyState::Used;
                Ok(ReplyOutcome::Sent)
            }
            Err(e) => {
                if matches!(e, BotError::AlreadyReplied) {
                    self.state = ReplyState::Used;
                }
                Err(e)
            }
        }
    }
}

/// A user-initiated interaction, owned by the router while it is handled
pub struct Interaction {
    pub kind: InteractionKind,
    pub command_name: String,
    pub user_id: u64,
    pub guild_id: Option<u64>,
    pub reply: ReplyCapability,
}

impl Interaction {
    pub fn new(
        kind: InteractionKind,
        command_name: impl Into<String>,
        responder: impl InteractionResponder + 'static,
    ) -> Self {
        Self {
            kind,
            command_name: command_name.into(),
            user_id: 0,
            guild_id: None,
            reply: ReplyCapability::new(responder),
        }
    }

    pub fn with_user(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_guild(mut self, guild_id: Option<u64>) -> Self {
        self.guild_id = guild_id;
        self
    }
}
