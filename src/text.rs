//! Font resolution and auto-sized text rendering.

use crate::config::FontConfig;
use crate::error::{Error, Result};
use crate::image::{ImgBackend, CANVAS_SIZE};

use fontconfig::{Fontconfig, Pattern};
use fontconfig_sys::fontconfig as sys;
use libvips::VipsImage;
use pango::prelude::FontMapExt;
use std::ffi::CString;
use std::path::Path;
use std::sync::OnceLock;

/// Largest point size tried by the fit scan.
pub const MAX_FONT_SIZE: i32 = 42;
/// Smallest point size tried by the fit scan.
pub const MIN_FONT_SIZE: i32 = 10;
/// Gap kept between the text and the canvas's right and top edges.
pub const TEXT_PADDING: i32 = 5;

/// The single font family a batch renders its overlay text with.
///
/// Resolution is deferred to the first text field so image-only batches
/// never touch fontconfig. There is no fallback font: a resolution failure
/// fails the invocation that needed it.
pub struct FontMap {
    config: FontConfig,
    resolved: OnceLock<std::result::Result<ResolvedFont, String>>,
}

struct ResolvedFont {
    // Keeps the fontconfig handle alive alongside any file registration.
    _fc: Fontconfig,
    family: String,
}

impl FontMap {
    pub fn new(config: FontConfig) -> Self {
        Self {
            config,
            resolved: OnceLock::new(),
        }
    }

    /// The resolved family name, loading the configured font on first use.
    pub fn family(&self) -> Result<&str> {
        let resolved = self
            .resolved
            .get_or_init(|| resolve(&self.config).map_err(|e| e.to_string()));
        match resolved {
            Ok(font) => Ok(&font.family),
            Err(e) => Err(Error::FontLoad(e.clone())),
        }
    }
}

fn resolve(config: &FontConfig) -> std::result::Result<ResolvedFont, String> {
    let fc = Fontconfig::new().ok_or_else(|| String::from("fontconfig init failed"))?;
    let family = if let Some(path) = &config.path {
        register_file(&fc, path)?
    } else if let Some(family) = &config.family {
        let font = fc
            .find(family, None)
            .ok_or_else(|| format!("no match for family `{family}`"))?;
        font.name
    } else {
        return Err("no font path or family configured".into());
    };
    Ok(ResolvedFont { _fc: fc, family })
}

/// Registers a font file with the process fontconfig and returns the family
/// name it declares.
fn register_file(fc: &Fontconfig, fp: &Path) -> std::result::Result<String, String> {
    let c_fp = CString::new(fp.to_string_lossy().as_bytes())
        .map_err(|_| format!("invalid font path `{}`", fp.display()))?;

    let family = scan_family(fc, &c_fp)
        .ok_or_else(|| format!("no font found in `{}`", fp.display()))?;

    let status = unsafe {
        sys::FcConfigAppFontAddFile(std::ptr::null_mut(), c_fp.as_ptr() as *const sys::FcChar8)
    };
    if status == 0 {
        return Err(format!("failed to register `{}`", fp.display()));
    }
    Ok(family)
}

fn scan_family(fc: &Fontconfig, c_fp: &CString) -> Option<String> {
    unsafe {
        let set = sys::FcFontSetCreate();
        let status = sys::FcFileScan(
            set,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            c_fp.as_ptr() as *const sys::FcChar8,
            1,
        );
        let family = if status == 0 || (*set).nfont < 1 {
            None
        } else {
            let pat = Pattern::from_pattern(fc, *(*set).fonts);
            pat.name().map(|s| s.to_string())
        };
        sys::FcFontSetDestroy(set);
        family
    }
}

/// Picks the largest size in `[MIN_FONT_SIZE, MAX_FONT_SIZE]` whose measured
/// width fits `max_width`.
///
/// The scan walks downward and stops at the floor even when the floor still
/// overflows; the caller renders at whatever came out. No found-flag, same
/// as the batches have always behaved.
pub fn fit_size(max_width: i32, mut measure: impl FnMut(i32) -> i32) -> i32 {
    let mut size = MAX_FONT_SIZE;
    while size >= MIN_FONT_SIZE {
        if measure(size) <= max_width {
            break;
        }
        size -= 1;
    }
    size.max(MIN_FONT_SIZE)
}

/// Renders `text` onto the canvas, anchored to the top-right corner with
/// [`TEXT_PADDING`] on both edges, at the largest size that fits the canvas
/// width.
pub fn draw_top_right(
    ib: &ImgBackend,
    canvas: VipsImage,
    fonts: &FontMap,
    text: &str,
) -> Result<VipsImage> {
    let family = fonts.family()?;

    let ctx = pangocairo::FontMap::new().create_context();
    let mut opt = cairo::FontOptions::new().map_err(Error::cairo)?;
    opt.set_antialias(cairo::Antialias::Good);
    pangocairo::functions::context_set_font_options(&ctx, Some(&opt));

    let layout = pango::Layout::new(&ctx);
    layout.set_text(text);

    let description =
        |size: i32| pango::FontDescription::from_string(&format!("{family} {size}"));
    let size = fit_size(CANVAS_SIZE - TEXT_PADDING * 2, |s| {
        layout.set_font_description(Some(&description(s)));
        layout.pixel_size().0
    });
    layout.set_font_description(Some(&description(size)));
    let (text_w, text_h) = layout.pixel_size();

    let surface =
        cairo::ImageSurface::create(cairo::Format::ARgb32, text_w.max(1), text_h.max(1))
            .map_err(Error::cairo)?;
    let cr = cairo::Context::new(&surface).map_err(Error::cairo)?;
    cr.set_source_rgba(0.0, 0.0, 0.0, 1.0);
    pangocairo::functions::show_layout(&cr, &layout);
    drop(cr);

    let rendered = ib.from_cairo(surface)?;
    let x = CANVAS_SIZE - text_w - TEXT_PADDING;
    let y = TEXT_PADDING;
    ib.overlay_at(canvas, &rendered, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_at_max_when_text_is_short() {
        // Width grows with size; everything fits.
        assert_eq!(fit_size(590, |s| s * 10), MAX_FONT_SIZE);
    }

    #[test]
    fn steps_down_to_first_fitting_size() {
        // 20 px per point: 29 * 20 = 580 <= 580, 30 * 20 = 600 > 580.
        assert_eq!(fit_size(580, |s| s * 20), 29);
    }

    #[test]
    fn floor_is_used_even_on_overflow() {
        assert_eq!(fit_size(590, |_| 10_000), MIN_FONT_SIZE);
    }

    #[test]
    fn exact_fit_at_floor() {
        assert_eq!(fit_size(100, |s| s * 10), MIN_FONT_SIZE);
    }

    #[test]
    fn selection_never_leaves_range() {
        for w in [0, 1, 100, 599, 10_000] {
            let s = fit_size(w, |s| s * 13);
            assert!((MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&s));
        }
    }

    #[test]
    fn unconfigured_font_fails_lazily() {
        let fonts = FontMap::new(FontConfig {
            path: None,
            family: None,
        });
        assert!(matches!(fonts.family(), Err(Error::FontLoad(_))));
    }

    #[test]
    fn missing_font_file_fails_lazily() {
        let fonts = FontMap::new(FontConfig {
            path: Some("/definitely/not/a/font.ttf".into()),
            family: None,
        });
        assert!(matches!(fonts.family(), Err(Error::FontLoad(_))));
    }
}
