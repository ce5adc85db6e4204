//! SVG drawing surface rasterized to PNG via resvg

use std::fmt::Write;
use std::ops::{Deref, DerefMut};

use base64::Engine;
use resvg::tiny_skia;
use resvg::usvg;

use crate::application::errors::ComposeError;

/// Fixed-size drawing surface.
///
/// Draw calls append SVG elements in paint order; `render_png`
/// rasterizes the result.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    defs: String,
    body: String,
    clip_count: usize,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            clip_count: 0,
        }
    }

    /// Paint the whole surface with a solid color
    pub fn fill(&mut self, color: &str) {
        let _ = write!(
            self.body,
            r#"<rect width="{}" height="{}" fill="{color}"/>"#,
            self.width, self.height,
        );
    }

    /// Draw PNG bytes stretched into the given box
    pub fn draw_image(&mut self, png: &[u8], x: f32, y: f32, w: f32, h: f32) {
        let data = base64::engine::general_purpose::STANDARD.encode(png);
        let _ = write!(
            self.body,
            r#"<image x="{x}" y="{y}" width="{w}" height="{h}" preserveAspectRatio="none" xlink:href="data:image/png;base64,{data}"/>"#,
        );
    }

    /// Draw text with its baseline starting at (x, y)
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, font_family: &str, color: &str) {
        let _ = write!(
            self.body,
            r#"<text x="{x}" y="{y}" font-family="{font_family}" font-size="{font_size}" fill="{color}">{}</text>"#,
            xml_escape(text),
        );
    }

    /// Restrict drawing to a circle until the returned scope is dropped
    pub fn clip_circle(&mut self, cx: f32, cy: f32, r: f32) -> ClipScope<'_> {
        self.clip_count += 1;
        let id = format!("clip-{}", self.clip_count);
        let _ = write!(
            self.defs,
            r#"<clipPath id="{id}"><circle cx="{cx}" cy="{cy}" r="{r}"/></clipPath>"#,
        );
        let _ = write!(self.body, r#"<g clip-path="url(#{id})">"#);
        ClipScope { canvas: self }
    }

    pub fn to_svg(&self) -> String {
        let mut s = String::with_capacity(self.defs.len() + self.body.len() + 256);
        let _ = write!(
            s,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        let _ = write!(s, "<defs>{}</defs>", self.defs);
        s.push_str(&self.body);
        s.push_str("</svg>");
        s
    }

    pub fn render_png(&self, options: &usvg::Options) -> Result<Vec<u8>, ComposeError> {
        let tree = usvg::Tree::from_data(self.to_svg().as_bytes(), options)
            .map_err(|e| ComposeError::Render(format!("SVG parse: {e}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height)
            .ok_or_else(|| ComposeError::Render("pixmap allocation failed".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| ComposeError::Encode(e.to_string()))
    }
}

/// Active clip region. Dropping it restores the unclipped state.
pub struct ClipScope<'a> {
    canvas: &'a mut Canvas,
}

impl Deref for ClipScope<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl DerefMut for ClipScope<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        self.canvas.body.push_str("</g>");
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}
