use crate::domain::entities::{
    Command, CommandContext, CommandRegistry, Interaction, InteractionKind, ReplyCapability,
    ReplyOutcome,
};
use crate::application::errors::BotError;

pub const DEFAULT_FALLBACK_REPLY: &str = "An error occurred, sorry.";

/// Terminal state of one interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Not a chat input command
    Ignored,
    /// No handler for the command name
    Unhandled,
    Replied,
    FallbackReplied,
    /// Primary attempt failed after the capability was spent
    FallbackSkipped,
    FallbackFailed,
}

/// Routes slash command interactions to their handlers
pub struct CommandService {
    registry: CommandRegistry,
    fallback_reply: String,
}

impl CommandService {
    pub fn new() -> Self {
        Self {
            registry: CommandRegistry::new(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }

    pub fn with_fallback_reply(mut self, text: impl Into<String>) -> Self {
        self.fallback_reply = text.into();
        self
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_greeting(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        reply: impl Into<String>,
    ) {
        self.register(Command::fixed_reply(name, description, reply));
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle one interaction to a terminal state. Never fails.
    pub async fn handle(&self, interaction: Interaction) -> InteractionOutcome {
        if interaction.kind != InteractionKind::ChatInputCommand {
            return InteractionOutcome::Ignored;
        }

        // Unknown names get no reply and no log.
        let Some(command) = self.registry.get(&interaction.command_name) else {
            return InteractionOutcome::Unhandled;
        };

        let ctx = CommandContext {
            command_name: interaction.command_name.clone(),
            user_id: interaction.user_id,
            guild_id: interaction.guild_id,
        };
        let mut reply = interaction.reply;

        let result = match command.execute(&ctx) {
            Ok(text) => reply.reply(&text).await.map(|_| ()),
            Err(e) => Err(BotError::Command(e)),
        };

        match result {
            Ok(()) => {
                tracing::debug!(command = %ctx.command_name, user = ctx.user_id, "Replied to command");
                InteractionOutcome::Replied
            }
            Err(e) => {
                tracing::error!(command = %ctx.command_name, "Error replying to command: {}", e);
                self.fallback(&mut reply).await
            }
        }
    }

    async fn fallback(&self, reply: &mut ReplyCapability) -> InteractionOutcome {
        if reply.is_used() {
            return InteractionOutcome::FallbackSkipped;
        }

        match reply.reply(&self.fallback_reply).await {
            Ok(ReplyOutcome::Sent) => InteractionOutcome::FallbackReplied,
            Ok(ReplyOutcome::AlreadyReplied) => InteractionOutcome::FallbackSkipped,
            Err(e) => {
                tracing::error!("Fallback reply failed: {}", e);
                InteractionOutcome::FallbackFailed
            }
        }
    }
}

impl Default for CommandService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::CommandError;
    use crate::domain::traits::InteractionResponder;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const GREETING: &str = "おはようございます！ ☀️";

    #[derive(Clone, Copy)]
    enum Step {
        Accept,
        Fail,
        AlreadyAcknowledged,
    }

    /// Responder that replays a script of outcomes and records every call
    struct ScriptedResponder {
        script: Mutex<VecDeque<Step>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl InteractionResponder for ScriptedResponder {
        async fn respond(&self, text: &str) -> Result<(), BotError> {
            self.calls.lock().unwrap().push(text.to_string());
            let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Accept);
            match step {
                Step::Accept => Ok(()),
                Step::Fail => Err(BotError::Discord("503 Service Unavailable".to_string())),
                Step::AlreadyAcknowledged => Err(BotError::AlreadyReplied),
            }
        }
    }

    fn interaction(
        kind: InteractionKind,
        name: &str,
        script: Vec<Step>,
    ) -> (Interaction, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let responder = ScriptedResponder {
            script: Mutex::new(script.into()),
            calls: Arc::clone(&calls),
        };
        let interaction = Interaction::new(kind, name, responder)
            .with_user(42)
            .with_guild(Some(7));
        (interaction, calls)
    }

    fn service() -> CommandService {
        let mut service = CommandService::new();
        service.register_greeting("greet", "Say good morning", GREETING);
        service
    }

    #[tokio::test]
    async fn greet_replies_once_with_greeting() {
        let (interaction, calls) = interaction(InteractionKind::ChatInputCommand, "greet", vec![]);

        let outcome = service().handle(interaction).await;

        assert_eq!(outcome, InteractionOutcome::Replied);
        assert_eq!(*calls.lock().unwrap(), vec![GREETING.to_string()]);
    }

    #[tokio::test]
    async fn non_command_kinds_make_no_calls() {
        for kind in [
            InteractionKind::ContextMenuCommand,
            InteractionKind::Autocomplete,
            InteractionKind::Component,
            InteractionKind::Modal,
        ] {
            let (interaction, calls) = interaction(kind, "greet", vec![]);
            assert_eq!(service().handle(interaction).await, InteractionOutcome::Ignored);
            assert!(calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn unknown_command_is_silent() {
        let (interaction, calls) =
            interaction(InteractionKind::ChatInputCommand, "weather", vec![]);

        assert_eq!(service().handle(interaction).await, InteractionOutcome::Unhandled);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_reply_sends_one_fallback() {
        let (interaction, calls) =
            interaction(InteractionKind::ChatInputCommand, "greet", vec![Step::Fail]);

        let outcome = service().handle(interaction).await;

        assert_eq!(outcome, InteractionOutcome::FallbackReplied);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![GREETING.to_string(), DEFAULT_FALLBACK_REPLY.to_string()]
        );
    }

    #[tokio::test]
    async fn failed_fallback_is_swallowed() {
        let (interaction, calls) = interaction(
            InteractionKind::ChatInputCommand,
            "greet",
            vec![Step::Fail, Step::Fail],
        );

        let outcome = service().handle(interaction).await;

        assert_eq!(outcome, InteractionOutcome::FallbackFailed);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn already_acknowledged_skips_fallback() {
        let (interaction, calls) = interaction(
            InteractionKind::ChatInputCommand,
            "greet",
            vec![Step::AlreadyAcknowledged],
        );

        let outcome = service().handle(interaction).await;

        assert_eq!(outcome, InteractionOutcome::FallbackSkipped);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn handler_error_falls_back() {
        let mut service = CommandService::new().with_fallback_reply("すみません、エラーが発生しました。");
        service.register(Command::new("broken", "Always fails", |_ctx| {
            Err(CommandError::ExecutionFailed("nope".to_string()))
        }));
        let (interaction, calls) =
            interaction(InteractionKind::ChatInputCommand, "broken", vec![]);

        let outcome = service.handle(interaction).await;

        assert_eq!(outcome, InteractionOutcome::FallbackReplied);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["すみません、エラーが発生しました。".to_string()]
        );
    }

    #[tokio::test]
    async fn handler_sees_invoker() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut service = CommandService::new();
        service.register(Command::new("whoami", "Echo caller", move |ctx| {
            *sink.lock().unwrap() = Some(ctx.clone());
            Ok(format!("<@{}>", ctx.user_id))
        }));
        let (interaction, calls) =
            interaction(InteractionKind::ChatInputCommand, "whoami", vec![]);

        service.handle(interaction).await;

        let ctx = seen.lock().unwrap().clone().unwrap();
        assert_eq!(ctx.user_id, 42);
        assert_eq!(ctx.guild_id, Some(7));
        assert_eq!(*calls.lock().unwrap(), vec!["<@42>".to_string()]);
    }
}
