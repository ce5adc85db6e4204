//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod compositor;
pub mod responder;

pub use bot::Bot;
pub use compositor::ImageCompositor;
pub use responder::InteractionResponder;
