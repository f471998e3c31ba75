//! Overlay raster construction
//!
//! Produces the visual-feedback raster: a copy of the capture with matched
//! regions flagged by marker colors. The primary mask is applied first and
//! the secondary mask second, so a pixel matching both reference colors
//! always renders as the secondary marker.

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::classify::stats::MatchMask;
use crate::constants::markers;

/// Build an overlay of `raster` with matched pixels replaced by markers
///
/// # Arguments
///
/// * `raster` - the original capture
/// * `primary` - mask for the primary reference color (marker A, applied first)
/// * `secondary` - mask for the secondary reference color (marker B, applied
///   second; wins where both match)
///
/// # Returns
///
/// The overlay raster, or `None` when either mask's dimensions do not match
/// the raster (the masks must come from classifying this raster).
pub fn build_overlay(
    raster: &RgbImage,
    primary: &MatchMask,
    secondary: &MatchMask,
) -> Option<RgbImage> {
    let dims = raster.dimensions();
    if primary.dimensions() != dims || secondary.dimensions() != dims {
        debug!(
            raster = ?dims,
            primary = ?primary.dimensions(),
            secondary = ?secondary.dimensions(),
            "overlay skipped: mask dimensions do not match raster"
        );
        return None;
    }

    let mut overlay = raster.clone();
    for (x, y, pixel) in overlay.enumerate_pixels_mut() {
        if primary.is_hit(x, y) {
            *pixel = Rgb(markers::PRIMARY_MARKER);
        }
        if secondary.is_hit(x, y) {
            *pixel = Rgb(markers::SECONDARY_MARKER);
        }
    }
    Some(overlay)
}
