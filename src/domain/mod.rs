//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (MemberJoinEvent, Interaction, Command, WelcomeImageSpec)
//! - Traits: Abstractions for infrastructure (Bot, ImageCompositor, InteractionResponder)

pub mod entities;
pub mod traits;
