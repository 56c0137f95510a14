//! Abstract layers composited onto the working canvas.

mod asset;
mod text;

pub use asset::AssetLayer;
pub use text::TextLayer;

use crate::error::Result;
use crate::image::{ImgBackend, CANVAS_SIZE};
use crate::logs::Reporter;
use crate::text::FontMap;

use core::fmt::Debug;
use libvips::VipsImage;

pub struct RenderContext<'a> {
    pub backend: &'a ImgBackend,
    pub fonts: &'a FontMap,
    pub reporter: &'a Reporter,
}

pub trait Layer: Debug {
    fn render(&self, img: VipsImage, ctx: &RenderContext) -> Result<VipsImage>;
}

/// The ordered layers of one job row. Rendering allocates a fresh white
/// canvas and applies the layers in table order.
#[derive(Debug)]
pub struct LayerStack(pub Vec<Box<dyn Layer>>);

impl LayerStack {
    pub fn render(self, ctx: &RenderContext) -> Result<VipsImage> {
        let mut img = ctx.backend.new_canvas(CANVAS_SIZE, CANVAS_SIZE)?;
        let LayerStack(layers) = self;
        for layer in layers.into_iter() {
            img = layer.render(img, ctx)?;
        }
        Ok(img)
    }
}
