use std::collections::BTreeMap;

use crate::application::errors::CommandError;

/// Represents a slash command the bot answers
pub struct Command {
    pub name: String,
    pub description: String,
    pub handler: CommandHandler,
}

/// Command handler function type
pub type CommandHandler = Box<dyn Fn(&CommandContext) -> Result<String, CommandError> + Send + Sync>;

/// Who invoked a command and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub command_name: String,
    pub user_id: u64,
    pub guild_id: Option<u64>,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandContext) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Box::new(handler),
        }
    }

    /// Command that always answers with the same text
    pub fn fixed_reply(
        name: impl Into<String>,
        description: impl Into<String>,
        reply: impl Into<String>,
    ) -> Self {
        let reply = reply.into();
        Self::new(name, description, move |_ctx| Ok(reply.clone()))
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<String, CommandError> {
        (self.handler)(ctx)
    }
}

/// Dispatch table keyed by exact command name.
///
/// The same table feeds slash command registration, so what Discord
/// offers and what the router answers cannot drift apart.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Commands in name order
    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
