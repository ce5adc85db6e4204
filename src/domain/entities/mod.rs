//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod interaction;
pub mod member;
pub mod welcome;

pub use command::{Command, CommandContext, CommandRegistry};
pub use interaction::{Interaction, InteractionKind, ReplyCapability, ReplyOutcome};
pub use member::MemberJoinEvent;
pub use welcome::{Composition, OutgoingMessage, RenderedImage, WelcomeImageSpec};
