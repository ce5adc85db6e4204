//! Welcome image inputs and outputs

use std::path::PathBuf;

pub const CANVAS_WIDTH: u32 = 700;
pub const CANVAS_HEIGHT: u32 = 250;
pub const AVATAR_DIAMETER: u32 = 200;
pub const WELCOME_FILENAME: &str = "welcome.png";

/// Caption drawn on the welcome card
pub fn welcome_caption(username: &str) -> String {
    format!("Welcome, {}!", username)
}

/// Everything the compositor needs to draw one welcome card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeImageSpec {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: Option<PathBuf>,
    pub avatar_url: String,
    pub avatar_diameter: u32,
    pub display_text: String,
}

impl WelcomeImageSpec {
    pub fn new(avatar_url: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            background: None,
            avatar_url: avatar_url.into(),
            avatar_diameter: AVATAR_DIAMETER,
            display_text: display_text.into(),
        }
    }

    pub fn with_background(mut self, background: Option<PathBuf>) -> Self {
        self.background = background;
        self
    }
}

/// Encoded image ready to attach to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl RenderedImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            filename: WELCOME_FILENAME.to_string(),
        }
    }
}

/// Result of a compose call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    Rendered(RenderedImage),
    /// Image rendering is not supported in this runtime
    Unavailable,
}

/// Outbound channel message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: String,
    pub attachment: Option<RenderedImage>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, image: RenderedImage) -> Self {
        self.attachment = Some(image);
        self
    }
}
