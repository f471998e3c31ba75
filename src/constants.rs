//! Tunable constants for sampling, classification, and clicking
//!
//! This module groups the compile-time defaults and limits that shape the
//! detection loop. Runtime-adjustable values live in [`crate::config`]; these
//! are the bounds and fixed parameters behind them.

/// Default values applied when configuration is absent or malformed
pub mod defaults {
    /// Default area tolerance (ΔE for LAB matching, channel units for RGB)
    pub const AREA_TOLERANCE: u8 = 15;

    /// Default capture box edge length in pixels
    pub const CAPTURE_BOX_SIZE: u32 = 300;

    /// Default primary reference color (RGB)
    pub const PRIMARY_COLOR_RGB: [u8; 3] = [204, 204, 204];

    /// Default secondary reference color (RGB)
    pub const SECONDARY_COLOR_RGB: [u8; 3] = [38, 120, 122];

    /// Clicking enabled out of the box
    pub const CLICKING_ENABLED: bool = true;

    /// Default pause/resume hotkey descriptor (consumed by the control surface)
    pub const PAUSE_HOTKEY: &str = "ctrl+shift+x";

    /// Default clicking-toggle hotkey descriptor
    pub const TOGGLE_CLICK_HOTKEY: &str = "ctrl+shift+c";
}

/// Valid ranges for runtime-adjustable settings
pub mod limits {
    /// Minimum area tolerance
    pub const TOLERANCE_MIN: u8 = 0;

    /// Maximum area tolerance
    pub const TOLERANCE_MAX: u8 = 100;

    /// Minimum capture box edge length in pixels
    pub const BOX_SIZE_MIN: u32 = 10;

    /// Maximum capture box edge length in pixels
    pub const BOX_SIZE_MAX: u32 = 600;
}

/// Loop and channel timing
pub mod timing {
    use std::time::Duration;

    /// Target duration of one detection tick
    pub const TICK_INTERVAL: Duration = Duration::from_millis(1);

    /// Minimum interval between two executed synthetic clicks
    pub const CLICK_COOLDOWN: Duration = Duration::from_millis(50);

    /// Poll interval while the loop is paused or a picker overlay is open
    pub const PAUSED_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Back-off after an unexpected tick-level error
    pub const ERROR_BACKOFF: Duration = Duration::from_millis(500);

    /// Suggested presentation-side drain cadence
    pub const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

    /// Bounded wait for the loop thread to exit after a stop request
    pub const STOP_JOIN_TIMEOUT: Duration = Duration::from_millis(500);
}

/// Dominant-color analysis parameters
pub mod analysis {
    /// Rasters are downsampled to at most this width before clustering
    pub const RESIZE_WIDTH: u32 = 64;

    /// Number of k-means clusters
    pub const CLUSTER_COUNT: usize = 10;

    /// Maximum k-means iterations per attempt
    pub const MAX_ITERATIONS: usize = 10;

    /// Center movement (ΔE) below which an attempt is considered converged
    pub const CONVERGENCE_EPSILON: f32 = 1.0;

    /// Independent restarts; the attempt with the lowest compactness wins
    pub const RESTART_ATTEMPTS: usize = 10;

    /// Clusters below this share of sampled pixels are dropped
    pub const MIN_SHARE_PERCENT: f32 = 2.0;
}

/// Overlay marker colors
pub mod markers {
    /// Marker for pixels matching the primary reference color
    pub const PRIMARY_MARKER: [u8; 3] = [255, 0, 0];

    /// Marker for pixels matching the secondary reference color
    pub const SECONDARY_MARKER: [u8; 3] = [0, 0, 255];
}

/// Result channel sizing
pub mod channel {
    /// Bounded capacity of the loop -> presentation channel; on overflow the
    /// oldest unread message is dropped, never the producer blocked
    pub const RESULT_CAPACITY: usize = 64;
}
