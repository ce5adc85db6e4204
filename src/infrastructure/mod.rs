//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Compositor: Welcome image rendering
//! - Adapters: Platform integrations (Discord)

pub mod config;
pub mod compositor;
pub mod adapters;
