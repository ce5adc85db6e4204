//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discord error: {0}")]
    Discord(String),

    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Interaction already replied")]
    AlreadyReplied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Welcome image errors that abort a compose call
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Avatar fetch failed: {0}")]
    AvatarFetch(String),

    #[error("Avatar decode failed: {0}")]
    AvatarDecode(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
