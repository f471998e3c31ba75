//! Frame sampling: capture geometry and the capture boundary
//!
//! The detection loop samples the display through the [`FrameSource`]
//! trait; [`ScreenSource`] is the production backend. The trait seam keeps
//! the loop testable against scripted rasters.

pub mod geometry;
pub mod screen;

pub use geometry::{capture_box_rect, pointer_pixel_rect, PixelRect};
pub use screen::ScreenSource;

use image::RgbImage;

/// Capture boundary consumed by the detection loop
///
/// `grab` is best-effort: any backend failure means "no sample this tick",
/// never an error that could stop the loop.
pub trait FrameSource {
    /// Dimensions of the captured screen in pixels
    fn screen_size(&self) -> (u32, u32);

    /// Capture a clipped screen rectangle as an RGB raster
    fn grab(&mut self, rect: PixelRect) -> Option<RgbImage>;

    /// Capture the whole screen (used by interactive pickers, not the loop)
    fn full_frame(&mut self) -> Option<RgbImage>;
}
