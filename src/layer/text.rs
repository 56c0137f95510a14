//! The literal-text overlay layer.

use crate::error::Result;
use crate::layer::{Layer, RenderContext};
use crate::text;

use libvips::VipsImage;

/// Overlay text drawn at the fixed top-right anchor, at the largest font
/// size that fits the canvas width.
#[derive(Debug, Clone)]
pub struct TextLayer {
    pub text: String,
}

impl Layer for TextLayer {
    fn render(&self, img: VipsImage, ctx: &RenderContext) -> Result<VipsImage> {
        text::draw_top_right(ctx.backend, img, ctx.fonts, &self.text)
    }
}
