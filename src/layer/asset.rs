//! An image layer loaded from an asset directory.

use crate::error::Result;
use crate::image::PasteMode;
use crate::layer::{Layer, RenderContext};

use libvips::VipsImage;
use std::path::PathBuf;

/// One asset cell: a resolved file path and whether the source-image resize
/// policy applies to it.
#[derive(Debug, Clone)]
pub struct AssetLayer {
    pub path: PathBuf,
    pub resize: bool,
}

impl Layer for AssetLayer {
    fn render(&self, img: VipsImage, ctx: &RenderContext) -> Result<VipsImage> {
        let ib = ctx.backend;
        let (asset, mode) = ib.open(&self.path)?;
        if mode == PasteMode::Unsupported {
            ctx.reporter.warn(format!(
                "unsupported asset format, nothing pasted: {}",
                self.path.display()
            ));
            return Ok(img);
        }
        let asset = if self.resize {
            ib.resize_to_fit(asset)?
        } else {
            asset
        };
        ib.paste(img, &asset, mode)
    }
}
