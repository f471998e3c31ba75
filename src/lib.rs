//! # Pixel Sentry
//!
//! A real-time screen color detection and automated clicking engine.
//!
//! The crate runs a fixed-cadence detection loop that:
//! - Samples the pixel under the pointer and a capture box around it
//! - Classifies pixels against two reference colors in Lab or RGB space
//! - Derives area statistics, a marker overlay, and a dominant-color palette
//! - Emits a synthetic click, under a cooldown, when the pointer pixel matches
//! - Publishes every result over a bounded channel that never blocks the loop
//!
//! ## Example
//!
//! ```no_run
//! use pixel_sentry::{
//!     command_queue, result_channel, DetectionConfig, DetectionLoop, EnigoDriver,
//!     NoFocusProbe, ScreenSource, SharedConfig,
//! };
//!
//! # fn main() -> pixel_sentry::Result<()> {
//! let config = SharedConfig::new(DetectionConfig::default());
//! let (publisher, consumer) = result_channel();
//! let (_commands, command_rx) = command_queue();
//!
//! let handle = DetectionLoop::new(
//!     config.clone(),
//!     ScreenSource::primary()?,
//!     EnigoDriver::new()?,
//!     NoFocusProbe,
//!     publisher,
//!     command_rx,
//! )
//! .start();
//!
//! config.set_paused(false);
//! for message in consumer.drain() {
//!     // hand to the presentation layer
//!     let _ = message;
//! }
//! handle.stop();
//! # Ok(())
//! # }
//! ```

use palette::Lab;

pub mod capture;
pub mod classify;
pub mod color;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod input;

pub use capture::{FrameSource, PixelRect, ScreenSource};
pub use classify::{AreaReading, AreaStats};
pub use color::{DominantColorEntry, DominantColorExtractor};
pub use config::{ClickMethod, DetectionConfig, PersistedConfig, ReferenceColor, SharedConfig};
pub use engine::{
    command_queue, result_channel, AreaUpdate, Command, CommandSender, DecisionEngine,
    DetectionLoop, LoopHandle, LoopMessage, ResultConsumer, ResultPublisher,
};
pub use error::{Result, SentryError};
pub use input::{EnigoDriver, FocusProbe, MouseButton, NoFocusProbe, PointerDriver, WindowBounds};

use crate::color::conversion::rgb_to_lab;
use crate::capture::pointer_pixel_rect;

/// One-shot reading of the pixel under the pointer
///
/// Used by inspection views outside the loop; returns both representations
/// the operator cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerProbe {
    /// Pointer position in screen coordinates
    pub position: (i32, i32),
    /// The pixel's RGB value
    pub rgb: [u8; 3],
    /// The pixel's Lab value
    pub lab: Lab,
}

/// Sample the pixel under the pointer once
///
/// Returns `None` when the pointer position is unavailable, the pointer is
/// off-screen, or the capture produced no sample.
pub fn probe_pointer(
    source: &mut dyn FrameSource,
    driver: &mut dyn PointerDriver,
) -> Option<PointerProbe> {
    let position = driver.position()?;
    let rect = pointer_pixel_rect(position.0, position.1, source.screen_size())?;
    let raster = source.grab(rect)?;
    let rgb = raster.pixels().next()?.0;
    Some(PointerProbe {
        position,
        rgb,
        lab: rgb_to_lab(rgb),
    })
}
