//! Per-pixel classification against a reference color
//!
//! Walks a capture raster, marks every pixel whose Lab distance to the
//! reference color is within tolerance, and derives area statistics from the
//! resulting mask. Matching compares squared ΔE against the squared
//! tolerance to keep the per-pixel cost to three multiplies.

use image::RgbImage;
use palette::Lab;

use crate::color::conversion::{delta_e_squared, rgb_to_lab};

/// Binary per-pixel match mask for one reference color
#[derive(Debug, Clone, PartialEq)]
pub struct MatchMask {
    width: u32,
    height: u32,
    hits: Vec<bool>,
}

impl MatchMask {
    /// Mask dimensions (matches the classified raster)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the pixel at (x, y) matched
    pub fn is_hit(&self, x: u32, y: u32) -> bool {
        self.hits[(y * self.width + x) as usize]
    }

    /// Number of matching pixels
    pub fn count(&self) -> u32 {
        self.hits.iter().filter(|&&hit| hit).count() as u32
    }
}

/// Outcome of classifying one reference color, as handed to the consumer
///
/// Replaces numeric sentinels with variants so the presentation layer can
/// distinguish a valid zero from "nothing to match" and "went wrong".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaReading {
    /// Classification ran; percent is in [0, 100]
    Valid { percent: f32, count: u32 },
    /// No reference color was configured for this slot
    NoReference,
    /// Classification failed for this tick
    ComputeError,
}

impl AreaReading {
    /// The percentage if this reading is valid
    pub fn percent(&self) -> Option<f32> {
        match self {
            AreaReading::Valid { percent, .. } => Some(*percent),
            _ => None,
        }
    }
}

/// Area readings for both reference colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaStats {
    pub primary: AreaReading,
    pub secondary: AreaReading,
}

impl AreaStats {
    /// Stats for a tick where no reference colors were configured
    pub fn no_reference() -> Self {
        Self {
            primary: AreaReading::NoReference,
            secondary: AreaReading::NoReference,
        }
    }

    /// Stats for a tick where classification failed
    pub fn compute_error() -> Self {
        Self {
            primary: AreaReading::ComputeError,
            secondary: AreaReading::ComputeError,
        }
    }

    /// Stats for a tick with no capture sample (valid zeros)
    pub fn empty() -> Self {
        let zero = AreaReading::Valid {
            percent: 0.0,
            count: 0,
        };
        Self {
            primary: zero,
            secondary: zero,
        }
    }
}

/// Result of scanning one raster against one reference color
#[derive(Debug, Clone)]
pub struct AreaScan {
    /// Matching pixels as a percentage of the raster (0-100)
    pub percent: f32,
    /// Matching pixel count
    pub count: u32,
    /// Per-pixel mask; absent for an empty raster
    pub mask: Option<MatchMask>,
}

/// Classify every pixel of `raster` against `reference`
///
/// A pixel matches iff its squared Lab distance to the reference is at most
/// `tolerance²`. An empty raster yields zero stats and no mask rather than
/// an error.
pub fn area_stats(raster: &RgbImage, reference: Lab, tolerance: f32) -> AreaScan {
    let (width, height) = raster.dimensions();
    let total = (width as u64 * height as u64) as u32;
    if total == 0 {
        return AreaScan {
            percent: 0.0,
            count: 0,
            mask: None,
        };
    }

    let tolerance_sq = tolerance * tolerance;
    let mut hits = Vec::with_capacity(total as usize);
    let mut count = 0u32;
    for pixel in raster.pixels() {
        let hit = delta_e_squared(rgb_to_lab(pixel.0), reference) <= tolerance_sq;
        if hit {
            count += 1;
        }
        hits.push(hit);
    }

    AreaScan {
        percent: count as f32 / total as f32 * 100.0,
        count,
        mask: Some(MatchMask {
            width,
            height,
            hits,
        }),
    }
}
