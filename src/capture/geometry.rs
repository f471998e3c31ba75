//! Capture rectangle geometry
//!
//! Computes the screen rectangles the sampler grabs: the 1x1 pointer pixel
//! and the capture box centered on the pointer. Rectangles are clipped to
//! the screen, so a box near an edge silently shrinks and shifts instead of
//! failing; a fully off-screen or zero-area result is "no sample".

/// A clipped, screen-space capture rectangle
///
/// Always lies inside the screen: `x + width <= screen_width` and
/// `y + height <= screen_height`, with non-zero dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Area in pixels
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Rectangle for the single pixel under the pointer
///
/// Returns `None` when the pointer is outside the screen.
pub fn pointer_pixel_rect(
    pointer_x: i32,
    pointer_y: i32,
    screen: (u32, u32),
) -> Option<PixelRect> {
    let (screen_w, screen_h) = screen;
    if pointer_x < 0 || pointer_y < 0 {
        return None;
    }
    let (x, y) = (pointer_x as u32, pointer_y as u32);
    if x >= screen_w || y >= screen_h {
        return None;
    }
    Some(PixelRect {
        x,
        y,
        width: 1,
        height: 1,
    })
}

/// Capture box of edge length `box_size` centered on the pointer
///
/// Clipping: `left = max(0, pointer_x - box_size / 2)` and
/// `width = min(box_size, screen_width - left)`, symmetrically for the
/// vertical axis. Returns `None` when the clipped rectangle has no area.
pub fn capture_box_rect(
    pointer_x: i32,
    pointer_y: i32,
    box_size: u32,
    screen: (u32, u32),
) -> Option<PixelRect> {
    let (screen_w, screen_h) = screen;
    let half = (box_size / 2) as i64;

    let left = (pointer_x as i64 - half).max(0);
    let top = (pointer_y as i64 - half).max(0);
    if left >= screen_w as i64 || top >= screen_h as i64 {
        return None;
    }

    let width = (box_size as i64).min(screen_w as i64 - left);
    let height = (box_size as i64).min(screen_h as i64 - top);
    if width <= 0 || height <= 0 {
        return None;
    }

    Some(PixelRect {
        x: left as u32,
        y: top as u32,
        width: width as u32,
        height: height as u32,
    })
}
