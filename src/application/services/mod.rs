//! Application services - Business logic orchestration

pub mod command_service;
pub mod welcome_service;

pub use command_service::CommandService;
pub use welcome_service::{WelcomeService, WelcomeSettings};
