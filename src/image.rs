//! Image backend implementation over libvips.

pub mod fit;

use crate::error::{Error, Result};
pub use crate::image::fit::{fit_within, FitPlan, MAX_SOURCE_HEIGHT};

use cairo::ImageSurface;
use libvips::{ops, VipsApp, VipsImage};
use std::mem::ManuallyDrop;
use std::path::Path;

/// Edge length of the working canvas. Both axes are fixed; the pipeline has
/// no notion of other canvas sizes.
pub const CANVAS_SIZE: i32 = 600;

/// JPEG quality used for lossy output.
pub const JPEG_QUALITY: i32 = 95;

/// How a source image is pasted onto the canvas, resolved once per asset
/// from its filename instead of re-derived at paste time.
///
/// The tag uses the original layout convention: a case-sensitive substring
/// match of `.jpg` / `.png` against the last four characters of the name.
/// `.jpeg` therefore tags as [`PasteMode::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteMode {
    /// Source rectangle fully overwrites the canvas; alpha is ignored.
    Opaque,
    /// Transparent source pixels leave canvas pixels untouched.
    AlphaMasked,
    /// No paste happens at all.
    Unsupported,
}

impl PasteMode {
    pub fn from_name(name: &str) -> Self {
        let tail_start = name
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let tail = &name[tail_start..];
        if tail.contains(".jpg") {
            Self::Opaque
        } else if tail.contains(".png") {
            Self::AlphaMasked
        } else {
            Self::Unsupported
        }
    }
}

pub struct ImgBackend {
    // vips stays initialized for the process lifetime; shutting it down
    // would break any other backend still alive in the same process.
    vips_app: ManuallyDrop<VipsApp>,
}

impl ImgBackend {
    pub fn new() -> Result<Self> {
        let app = libvips::VipsApp::default("itemshot")
            .map_err(|e| Error::Vips(e.to_string()))?;
        Ok(Self {
            vips_app: ManuallyDrop::new(app),
        })
    }

    pub fn err(&self, e: libvips::error::Error) -> Error {
        Error::Vips(format!(
            "{e}\n{}",
            self.vips_app.error_buffer().unwrap_or_default()
        ))
    }

    /// Normalizes any decoded image to 8-bit sRGB with an alpha band, so
    /// every later operation can assume RGBA.
    fn normalize(&self, img: &VipsImage) -> Result<VipsImage> {
        let img = ops::cast(img, ops::BandFormat::Uchar).map_err(|e| self.err(e))?;
        let img = ops::copy_with_opts(
            &img,
            &ops::CopyOptions {
                interpretation: ops::Interpretation::Srgb,
                width: img.get_width(),
                height: img.get_height(),
                bands: img.get_bands(),
                format: ops::BandFormat::Uchar,
                ..Default::default()
            },
        )
        .map_err(|e| self.err(e))?;
        if img.get_bands() == 3 {
            ops::bandjoin_const(&img, &mut [255.0]).map_err(|e| self.err(e))
        } else {
            Ok(img)
        }
    }

    /// Creates a fresh white working canvas.
    pub fn new_canvas(&self, width: i32, height: i32) -> Result<VipsImage> {
        let img = ops::black_with_opts(width, height, &ops::BlackOptions { bands: 4 })
            .map_err(|e| self.err(e))?;
        let img = VipsImage::new_from_image(&img, &[255.0, 255.0, 255.0, 255.0])
            .map_err(|e| self.err(e))?;
        self.normalize(&img)
    }

    /// Loads an asset and tags it with its paste capability.
    pub fn open(&self, fp: &Path) -> Result<(VipsImage, PasteMode)> {
        let name = fp
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let img = VipsImage::new_from_file(&fp.to_string_lossy())
            .map_err(|e| Error::asset_open(fp, self.err(e)))?;
        Ok((self.normalize(&img)?, PasteMode::from_name(&name)))
    }

    /// Applies the source-image resize policy. Nearest-neighbour resampling
    /// is deliberate: lowest fidelity, fastest, and what the batches have
    /// always produced.
    pub fn resize_to_fit(&self, img: VipsImage) -> Result<VipsImage> {
        let (w, h) = (img.get_width(), img.get_height());
        let plan = fit_within(w, h);
        if !plan.resample {
            return Ok(img);
        }
        let sx = plan.width as f64 / w as f64;
        let sy = plan.height as f64 / h as f64;
        ops::resize_with_opts(
            &img,
            sx,
            &ops::ResizeOptions {
                vscale: sy,
                kernel: ops::Kernel::Nearest,
                ..Default::default()
            },
        )
        .map_err(|e| self.err(e))
    }

    /// Composites `src` over `canvas` with its top-left corner at `(x, y)`.
    /// Negative positions are allowed and clip the source.
    pub fn overlay_at(&self, canvas: VipsImage, src: &VipsImage, x: i32, y: i32) -> Result<VipsImage> {
        let (cw, ch) = (canvas.get_width(), canvas.get_height());
        let src = ops::embed(src, x, y, cw, ch).map_err(|e| self.err(e))?;
        ops::composite_2(&canvas, &src, ops::BlendMode::Over).map_err(|e| self.err(e))
    }

    /// Pastes `src` centered on `canvas` according to its paste capability.
    /// [`PasteMode::Unsupported`] leaves the canvas untouched; the caller is
    /// expected to report it.
    pub fn paste(&self, canvas: VipsImage, src: &VipsImage, mode: PasteMode) -> Result<VipsImage> {
        let (w, h) = (src.get_width(), src.get_height());
        let x = centered(w);
        let y = centered(h);
        match mode {
            PasteMode::Opaque => {
                let src = self.force_opaque(src)?;
                self.overlay_at(canvas, &src, x, y)
            }
            PasteMode::AlphaMasked => self.overlay_at(canvas, src, x, y),
            PasteMode::Unsupported => Ok(canvas),
        }
    }

    fn force_opaque(&self, img: &VipsImage) -> Result<VipsImage> {
        let rgb = ops::extract_band_with_opts(img, 0, &ops::ExtractBandOptions { n: 3 })
            .map_err(|e| self.err(e))?;
        ops::bandjoin_const(&rgb, &mut [255.0]).map_err(|e| self.err(e))
    }

    /// Converts a rendered cairo surface (text) into a vips image.
    pub fn from_cairo(&self, surface: ImageSurface) -> Result<VipsImage> {
        let mut buffer = Vec::new();
        surface
            .write_to_png(&mut buffer)
            .map_err(|_| Error::Cairo("failed to convert surface to png".into()))?;
        let mut img = VipsImage::new_from_buffer(&buffer, "").map_err(|e| self.err(e))?;
        img.image_wio_input().map_err(|e| self.err(e))?;
        self.normalize(&img)
    }

    /// Drops the alpha band for output.
    pub fn flatten_rgb(&self, img: &VipsImage) -> Result<VipsImage> {
        if img.get_bands() == 3 {
            return ops::copy(img).map_err(|e| self.err(e));
        }
        ops::extract_band_with_opts(img, 0, &ops::ExtractBandOptions { n: 3 })
            .map_err(|e| self.err(e))
    }

    /// Saves the finished canvas; the format is implied by the extension.
    pub fn write(&self, img: &VipsImage, path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let rgb = self.flatten_rgb(img)?;
        let fp = path.to_string_lossy();
        match ext.as_str() {
            "jpg" | "jpeg" => ops::jpegsave_with_opts(
                &rgb,
                &fp,
                &ops::JpegsaveOptions {
                    q: JPEG_QUALITY,
                    ..Default::default()
                },
            )
            .map_err(|e| self.err(e)),
            "png" => ops::pngsave(&rgb, &fp).map_err(|e| self.err(e)),
            _ => Err(Error::UnsupportedOutput(path.display().to_string())),
        }
    }
}

// Half-pixel offsets round ties to even.
fn centered(dim: i32) -> i32 {
    ((CANVAS_SIZE - dim) as f64 / 2.0).round_ties_even() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centering_rounds_ties_to_even() {
        assert_eq!(centered(300), 150);
        // (600 - 299) / 2 = 150.5: the even neighbour wins.
        assert_eq!(centered(299), 150);
        assert_eq!(centered(301), 150);
        assert_eq!(centered(601), 0);
    }

    #[test]
    fn paste_mode_by_suffix() {
        assert_eq!(PasteMode::from_name("front.jpg"), PasteMode::Opaque);
        assert_eq!(PasteMode::from_name("badge.png"), PasteMode::AlphaMasked);
        assert_eq!(PasteMode::from_name("scan.jpeg"), PasteMode::Unsupported);
        assert_eq!(PasteMode::from_name("notes.txt"), PasteMode::Unsupported);
        assert_eq!(PasteMode::from_name("a.JPG"), PasteMode::Unsupported);
    }

    #[test]
    fn paste_mode_short_names() {
        assert_eq!(PasteMode::from_name(".png"), PasteMode::AlphaMasked);
        assert_eq!(PasteMode::from_name("png"), PasteMode::Unsupported);
        assert_eq!(PasteMode::from_name(""), PasteMode::Unsupported);
    }
}
