//! Color space conversion and distance utilities
//!
//! Provides the math the classifier and decision engine are built on:
//! - RGB (0-255) to CIE Lab via the standard sRGB -> XYZ -> Lab pipeline
//! - Lab to RGB with gamut clamping
//! - Euclidean Lab distance (ΔE76) for perceptual tolerance thresholding
//! - Per-channel RGB tolerance as the cheaper, less perceptual alternative
//!
//! Lab distance approximates human color perception far better than raw RGB
//! distance when matching anti-aliased or lit sprites; both methods are
//! offered and the operator picks one per click decision.

use palette::{FromColor, IntoColor, Lab, Srgb};

/// Convert an RGB triple (0-255 per channel) to CIE Lab (D65)
///
/// The conversion is total: `u8` channels cannot be out of range, and the
/// sRGB -> Lab pipeline is defined for every input.
pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    let srgb = Srgb::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    );
    Lab::from_color(srgb)
}

/// Convert a Lab color back to an RGB triple
///
/// Out-of-gamut results are clamped per channel before quantization, so any
/// Lab input produces a displayable color.
pub fn lab_to_rgb(lab: Lab) -> [u8; 3] {
    let srgb: Srgb = lab.into_color();
    [
        (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

/// Compute ΔE (color difference) between two Lab colors
///
/// Uses Euclidean distance (ΔE76), sufficient for tolerance thresholding.
pub fn delta_e(a: Lab, b: Lab) -> f32 {
    delta_e_squared(a, b).sqrt()
}

/// Squared ΔE, for comparisons against a squared tolerance without the sqrt
pub fn delta_e_squared(a: Lab, b: Lab) -> f32 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    dl * dl + da * da + db * db
}

/// Check whether every channel of `a` is within `tolerance` of `b`
pub fn rgb_within_tolerance(a: [u8; 3], b: [u8; 3], tolerance: u8) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&x, &y)| (i16::from(x) - i16::from(y)).abs() <= i16::from(tolerance))
}

/// Format an RGB triple as a hex color string (e.g. "#FF0000")
pub fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Parse a comma-separated RGB triple from operator input
///
/// Accepts "r, g, b" with optional whitespace; returns `None` unless exactly
/// three components parse into 0-255.
pub fn parse_rgb_triple(input: &str) -> Option<[u8; 3]> {
    let mut parts = input.split(',').map(|c| c.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([r, g, b])
}

/// Pick black or white text for readability over a colored swatch
///
/// BT.601 luma; backgrounds brighter than mid-gray get black text.
pub fn readable_text_color(rgb: [u8; 3]) -> [u8; 3] {
    let luminance =
        (0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32) / 255.0;
    if luminance > 0.5 {
        [0, 0, 0]
    } else {
        [255, 255, 255]
    }
}
