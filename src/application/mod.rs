//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Command routing and welcome notifications
//! - Errors: Domain-specific errors

pub mod errors;
pub mod services;
