//! Screen capture backed by `xcap`
//!
//! Implements the [`FrameSource`] boundary over the primary monitor.
//! Backend failures are transient by contract: every grab error is swallowed
//! into "no sample" for that tick and logged at debug level, so a driver
//! hiccup can never terminate the detection loop.

use image::RgbImage;
use tracing::debug;
use xcap::Monitor;

use crate::capture::geometry::PixelRect;
use crate::capture::FrameSource;
use crate::error::{Result, SentryError};

/// Frame source reading from the primary monitor
pub struct ScreenSource {
    monitor: Monitor,
    width: u32,
    height: u32,
}

impl ScreenSource {
    /// Open the primary monitor (or the first one if none is marked primary)
    ///
    /// # Errors
    ///
    /// Returns `SentryError::CaptureBackend` when no monitor can be
    /// enumerated or its geometry cannot be read.
    pub fn primary() -> Result<Self> {
        let mut monitors = Monitor::all()
            .map_err(|e| SentryError::capture(format!("failed to enumerate monitors: {e}")))?;
        if monitors.is_empty() {
            return Err(SentryError::capture("no monitors found"));
        }

        let index = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors.swap_remove(index);

        let width = monitor
            .width()
            .map_err(|e| SentryError::capture(format!("failed to read monitor width: {e}")))?;
        let height = monitor
            .height()
            .map_err(|e| SentryError::capture(format!("failed to read monitor height: {e}")))?;
        if width == 0 || height == 0 {
            return Err(SentryError::capture("monitor reports zero dimensions"));
        }

        Ok(Self {
            monitor,
            width,
            height,
        })
    }
}

impl FrameSource for ScreenSource {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab(&mut self, rect: PixelRect) -> Option<RgbImage> {
        match self
            .monitor
            .capture_region(rect.x, rect.y, rect.width, rect.height)
        {
            Ok(rgba) => Some(image::DynamicImage::ImageRgba8(rgba).to_rgb8()),
            Err(e) => {
                debug!(?rect, error = %e, "region capture failed, tick has no sample");
                None
            }
        }
    }

    fn full_frame(&mut self) -> Option<RgbImage> {
        match self.monitor.capture_image() {
            Ok(rgba) => Some(image::DynamicImage::ImageRgba8(rgba).to_rgb8()),
            Err(e) => {
                debug!(error = %e, "full-frame capture failed");
                None
            }
        }
    }
}
