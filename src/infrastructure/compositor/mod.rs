//! Welcome card compositor
//!
//! Draws a 700×250 card: background (image or solid fill), the member's
//! avatar clipped to a circle, and a caption. Rendering goes through
//! resvg, so the capability depends on system fonts being loadable.

mod canvas;

use canvas::Canvas;

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::ImageFormat;
use reqwest::Client;
use resvg::usvg;
use resvg::usvg::fontdb::{self, Family, Query};

use crate::application::errors::ComposeError;
use crate::domain::entities::{Composition, RenderedImage, WelcomeImageSpec};
use crate::domain::traits::ImageCompositor;

const BACKGROUND_FILL: &str = "#2C2F33";
const TEXT_FILL: &str = "#FFFFFF";
const FONT_FAMILY: &str = "'Noto Sans', 'DejaVu Sans', 'Liberation Sans', 'Arial', 'Helvetica', sans-serif";
/// Same chain as `FONT_FAMILY`, for probing the font database
const CAPTION_FAMILIES: &[Family<'static>] = &[
    Family::Name("Noto Sans"),
    Family::Name("DejaVu Sans"),
    Family::Name("Liberation Sans"),
    Family::Name("Arial"),
    Family::Name("Helvetica"),
    Family::SansSerif,
];
const FONT_SIZE: f32 = 30.0;
const AVATAR_CENTER_X: f32 = 125.0;
const TEXT_X: f32 = 250.0;
const TEXT_BASELINE_OFFSET: f32 = 15.0;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of avatar image bytes
#[async_trait]
pub trait AvatarFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ComposeError>;
}

/// Fetches avatars from the platform CDN
pub struct HttpAvatarFetcher {
    client: Client,
}

impl HttpAvatarFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("aisatsu-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self { client }
    }
}

impl Default for HttpAvatarFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvatarFetcher for HttpAvatarFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ComposeError> {
        let response = self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ComposeError::AvatarFetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ComposeError::AvatarFetch(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// Welcome card renderer, present only when the runtime can draw text
pub struct WelcomeCompositor<F: AvatarFetcher = HttpAvatarFetcher> {
    fetcher: F,
    renderer: Option<Arc<usvg::Options<'static>>>,
}

impl WelcomeCompositor<HttpAvatarFetcher> {
    /// Probe the runtime for rendering support.
    ///
    /// Scans system fonts, which can block for a while; call it before
    /// the runtime starts handling events.
    pub fn detect(enabled: bool) -> Self {
        Self::detect_with(HttpAvatarFetcher::new(), enabled)
    }
}

impl<F: AvatarFetcher> WelcomeCompositor<F> {
    pub fn detect_with(fetcher: F, enabled: bool) -> Self {
        if !enabled {
            tracing::info!("Welcome images disabled by configuration");
            return Self::unavailable(fetcher);
        }

        let mut options = usvg::Options::default();
        let fonts = options.fontdb_mut();
        fonts.load_system_fonts();

        let Some(family) = caption_font(fonts) else {
            tracing::warn!("No usable caption font found, welcome images disabled");
            return Self::unavailable(fetcher);
        };

        tracing::info!(fonts = options.fontdb.len(), %family, "Welcome image rendering available");
        Self::with_options(fetcher, options)
    }

    pub fn with_options(fetcher: F, options: usvg::Options<'static>) -> Self {
        Self {
            fetcher,
            renderer: Some(Arc::new(options)),
        }
    }

    pub fn unavailable(fetcher: F) -> Self {
        Self {
            fetcher,
            renderer: None,
        }
    }

    #[cfg(test)]
    pub fn is_available(&self) -> bool {
        self.renderer.is_some()
    }
}

/// Family the caption will be drawn with, if any.
///
/// When none of `CAPTION_FAMILIES` is installed, the generic sans-serif
/// family is pointed at the first loaded face.
fn caption_font(fonts: &mut fontdb::Database) -> Option<String> {
    let query = Query {
        families: CAPTION_FAMILIES,
        ..Query::default()
    };
    if let Some(id) = fonts.query(&query) {
        return fonts.face(id).and_then(|face| face.families.first()).map(|(name, _)| name.clone());
    }

    let family = fonts
        .faces()
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()))?;
    fonts.set_sans_serif_family(family.clone());
    Some(family)
}

#[async_trait]
impl<F: AvatarFetcher> ImageCompositor for WelcomeCompositor<F> {
    async fn compose(&self, spec: &WelcomeImageSpec) -> Result<Composition, ComposeError> {
        let Some(options) = &self.renderer else {
            return Ok(Composition::Unavailable);
        };

        let background = match &spec.background {
            Some(path) => read_background(path).await,
            None => None,
        };

        // Avatar errors are hard failures, unlike the background.
        let avatar = self.fetcher.fetch(&spec.avatar_url).await?;

        let spec = spec.clone();
        let options = Arc::clone(options);
        let png = tokio::task::spawn_blocking(move || {
            let avatar = to_png(&avatar).map_err(|e| ComposeError::AvatarDecode(e.to_string()))?;
            let background = background.and_then(|bytes| decode_background(&spec, &bytes));
            draw(&spec, background.as_deref(), &avatar).render_png(&options)
        })
        .await
        .map_err(|e| ComposeError::Render(e.to_string()))??;

        Ok(Composition::Rendered(RenderedImage::png(png)))
    }
}

/// Raw background bytes, or `None` to use the solid fill
async fn read_background(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read background image, using solid fill: {}", e);
            None
        }
    }
}

fn decode_background(spec: &WelcomeImageSpec, bytes: &[u8]) -> Option<Vec<u8>> {
    match to_png(bytes) {
        Ok(png) => Some(png),
        Err(e) => {
            let path = spec.background.as_deref().unwrap_or_else(|| Path::new(""));
            tracing::warn!(path = %path.display(), "Failed to decode background image, using solid fill: {}", e);
            None
        }
    }
}

/// Normalize any supported raster format to PNG for embedding
fn to_png(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let mut out = Cursor::new(Vec::new());
    decoded.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn draw(spec: &WelcomeImageSpec, background: Option<&[u8]>, avatar: &[u8]) -> Canvas {
    let mut canvas = Canvas::new(spec.canvas_width, spec.canvas_height);
    let width = spec.canvas_width as f32;
    let height = spec.canvas_height as f32;

    match background {
        Some(png) => canvas.draw_image(png, 0.0, 0.0, width, height),
        None => canvas.fill(BACKGROUND_FILL),
    }

    let diameter = spec.avatar_diameter as f32;
    let radius = diameter / 2.0;
    let center_y = height / 2.0;
    {
        let mut clip = canvas.clip_circle(AVATAR_CENTER_X, center_y, radius);
        clip.draw_image(avatar, AVATAR_CENTER_X - radius, center_y - radius, diameter, diameter);
    }

    canvas.fill_text(
        &spec.display_text,
        TEXT_X,
        height / 2.0 + TEXT_BASELINE_OFFSET,
        FONT_SIZE,
        FONT_FAMILY,
        TEXT_FILL,
    );
    canvas
}
