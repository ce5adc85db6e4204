use async_trait::async_trait;
use crate::domain::entities::{Composition, WelcomeImageSpec};
use crate::application::errors::ComposeError;

/// Renders welcome cards.
///
/// `Ok(Composition::Unavailable)` means rendering is unsupported in this
/// runtime and is an expected outcome. `Err` is a hard failure.
#[async_trait]
pub trait ImageCompositor: Send + Sync {
    async fn compose(&self, spec: &WelcomeImageSpec) -> Result<Composition, ComposeError>;
}
