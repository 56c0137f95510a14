//! Resize policy for primary source images.
//!
//! The policy is pure geometry so it can be tested without a vips backend:
//! scale the long side down to the canvas edge, then clamp the height to
//! [`MAX_SOURCE_HEIGHT`], preserving aspect ratio with 1px rounding.

use crate::image::CANVAS_SIZE;

/// Height cap applied to source images after the long-side scale.
pub const MAX_SOURCE_HEIGHT: i32 = 480;

/// Target dimensions for a source image, plus whether the pixel resample
/// should actually run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitPlan {
    pub width: i32,
    pub height: i32,
    pub resample: bool,
}

/// Computes the resize plan for a `width`×`height` source.
///
/// The resample only runs when BOTH dimensions end up different from the
/// original. When just one dimension changes the image is left at its
/// original size; batches have shipped with that behavior for years, so it
/// is kept as-is rather than corrected to an any-dimension check.
pub fn fit_within(width: i32, height: i32) -> FitPlan {
    if width == CANVAS_SIZE && height == CANVAS_SIZE {
        return FitPlan { width, height, resample: false };
    }

    let (mut fit_w, mut fit_h) = if width >= height && width > CANVAS_SIZE {
        let ratio = CANVAS_SIZE as f64 / width as f64;
        (CANVAS_SIZE, (height as f64 * ratio).round_ties_even() as i32)
    } else if height > width && height > CANVAS_SIZE {
        let ratio = CANVAS_SIZE as f64 / height as f64;
        ((width as f64 * ratio).round_ties_even() as i32, CANVAS_SIZE)
    } else {
        (width, height)
    };

    // Strict post-pass: applies even when the long-side scale was a no-op.
    if fit_h > MAX_SOURCE_HEIGHT {
        let ratio = MAX_SOURCE_HEIGHT as f64 / fit_h as f64;
        fit_w = (fit_w as f64 * ratio).round_ties_even() as i32;
        fit_h = MAX_SOURCE_HEIGHT;
    }

    FitPlan {
        width: fit_w,
        height: fit_h,
        resample: fit_w != width && fit_h != height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_sized_is_identity() {
        let plan = fit_within(600, 600);
        assert_eq!(plan, FitPlan { width: 600, height: 600, resample: false });
    }

    #[test]
    fn wide_image_scales_to_canvas_width() {
        let plan = fit_within(1200, 900);
        assert_eq!(plan.width, 600);
        assert_eq!(plan.height, 450);
        assert!(plan.resample);
    }

    #[test]
    fn tall_image_scales_then_clamps_height() {
        // 900x1800 -> long side 600 gives 300x600, clamp gives 240x480.
        let plan = fit_within(900, 1800);
        assert_eq!(plan, FitPlan { width: 240, height: 480, resample: true });
    }

    #[test]
    fn clamp_applies_without_primary_scale() {
        // Both sides fit in 600 but the height still exceeds 480.
        let plan = fit_within(400, 500);
        assert_eq!(plan.height, 480);
        assert_eq!(plan.width, 384);
        assert!(plan.resample);
    }

    #[test]
    fn square_oversize_lands_on_clamp() {
        // 700x700 -> 600x600 -> 480x480.
        let plan = fit_within(700, 700);
        assert_eq!(plan, FitPlan { width: 480, height: 480, resample: true });
    }

    #[test]
    fn small_image_is_untouched() {
        let plan = fit_within(320, 240);
        assert_eq!(plan, FitPlan { width: 320, height: 240, resample: false });
    }

    #[test]
    fn half_pixel_scales_round_to_even() {
        // 9 * 0.5 = 4.5 rounds down to the even 4.
        let plan = fit_within(1200, 9);
        assert_eq!(plan, FitPlan { width: 600, height: 4, resample: true });
    }

    #[test]
    fn single_changed_dimension_skips_resample() {
        // 10x500 clamps to 10x480: the width rounds back onto itself, so
        // only the height differs and the resample gate stays closed.
        let plan = fit_within(10, 500);
        assert_eq!(plan, FitPlan { width: 10, height: 480, resample: false });
    }
}
