//! Synthetic input and focus boundaries
//!
//! The decision engine reads the pointer and injects clicks through the
//! [`PointerDriver`] trait; [`EnigoDriver`] is the production backend. The
//! [`FocusProbe`] trait supplies the bounds of the tool's own window for the
//! self-occlusion guard; the real probe lives in the presentation layer.

use enigo::{Button, Direction, Enigo, Mouse, Settings};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SentryError};

/// Mouse button used for synthetic clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn to_backend(self) -> Button {
        match self {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
        }
    }
}

/// Pointer boundary consumed by the decision engine
///
/// Press/release are best-effort; a failed injection is reported as an
/// error but must be treated as non-fatal by the caller.
pub trait PointerDriver {
    /// Current pointer position in screen coordinates
    fn position(&mut self) -> Option<(i32, i32)>;

    /// Press the given button
    fn press(&mut self, button: MouseButton) -> Result<()>;

    /// Release the given button
    fn release(&mut self, button: MouseButton) -> Result<()>;
}

/// Pointer driver backed by `enigo`
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    /// Construct the backend with default settings
    ///
    /// # Errors
    ///
    /// Returns `SentryError::InputBackend` when the platform connection
    /// cannot be established.
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| SentryError::InputBackend {
            message: format!("failed to initialize input backend: {e}"),
        })?;
        Ok(Self { enigo })
    }
}

impl PointerDriver for EnigoDriver {
    fn position(&mut self) -> Option<(i32, i32)> {
        match self.enigo.location() {
            Ok(pos) => Some(pos),
            Err(e) => {
                debug!(error = %e, "pointer location unavailable");
                None
            }
        }
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        self.enigo
            .button(button.to_backend(), Direction::Press)
            .map_err(|e| SentryError::injection(format!("press failed: {e}")))
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        self.enigo
            .button(button.to_backend(), Direction::Release)
            .map_err(|e| SentryError::injection(format!("release failed: {e}")))
    }
}

/// Screen-space bounds of a window; may extend past screen edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowBounds {
    /// Whether the point lies inside these bounds
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && (x as i64) < self.x as i64 + self.width as i64
            && (y as i64) < self.y as i64 + self.height as i64
    }
}

/// Focus boundary for the self-occlusion guard
///
/// Returns the bounds of the tool's own window when it is the active
/// window, `None` otherwise. The loop never clicks while the pointer is
/// inside those bounds.
pub trait FocusProbe {
    fn active_window_bounds(&self) -> Option<WindowBounds>;
}

/// Probe for headless use: never reports occlusion
pub struct NoFocusProbe;

impl FocusProbe for NoFocusProbe {
    fn active_window_bounds(&self) -> Option<WindowBounds> {
        None
    }
}
