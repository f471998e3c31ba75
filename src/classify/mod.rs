//! Pixel classification against the reference colors
//!
//! Combines per-pixel masking, area statistics, and overlay construction
//! into the per-tick classification the control loop publishes.

pub mod overlay;
pub mod stats;

pub use overlay::build_overlay;
pub use stats::{area_stats, AreaReading, AreaScan, AreaStats, MatchMask};

use image::RgbImage;
use palette::Lab;

/// Full classification of one capture raster
#[derive(Debug, Clone)]
pub struct Classification {
    /// Area readings for both reference colors
    pub stats: AreaStats,
    /// Overlay raster; absent when the raster was empty
    pub overlay: Option<RgbImage>,
}

/// Classify a raster against both reference colors at once
///
/// Runs one scan per reference and builds the overlay from the two masks.
/// The caller handles the no-reference case before calling; this function
/// assumes both references exist.
pub fn classify(raster: &RgbImage, primary: Lab, secondary: Lab, tolerance: f32) -> Classification {
    let primary_scan = area_stats(raster, primary, tolerance);
    let secondary_scan = area_stats(raster, secondary, tolerance);

    let overlay = match (&primary_scan.mask, &secondary_scan.mask) {
        (Some(first), Some(second)) => build_overlay(raster, first, second),
        _ => None,
    };

    Classification {
        stats: AreaStats {
            primary: AreaReading::Valid {
                percent: primary_scan.percent,
                count: primary_scan.count,
            },
            secondary: AreaReading::Valid {
                percent: secondary_scan.percent,
                count: secondary_scan.count,
            },
        },
        overlay,
    }
}
