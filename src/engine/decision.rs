//! Click decision and execution
//!
//! Decides whether the pixel under the pointer authorizes a synthetic
//! click, and executes it under a cooldown that rate-limits injected input
//! regardless of loop frequency. The cooldown timestamp only advances on a
//! successful press/release pair, so a failed injection never eats a click
//! window.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::color::conversion::{delta_e, rgb_to_lab, rgb_within_tolerance};
use crate::config::{ClickMethod, DetectionConfig};
use crate::constants::timing;
use crate::input::{FocusProbe, MouseButton, PointerDriver};

/// Click decision state owned by the detection loop
pub struct DecisionEngine {
    cooldown: Duration,
    last_click: Option<Instant>,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionEngine {
    /// Create an engine with the default cooldown
    pub fn new() -> Self {
        Self::with_cooldown(timing::CLICK_COOLDOWN)
    }

    /// Create an engine with a custom cooldown
    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_click: None,
        }
    }

    /// Whether clicking is suppressed this tick, before any sampling
    ///
    /// Clicks are suppressed while clicking is disabled, while the operator
    /// has the inspection view open, and while the pointer sits inside the
    /// tool's own window (never click through the control surface).
    pub fn suppressed(
        &self,
        config: &DetectionConfig,
        pointer: (i32, i32),
        probe: &dyn FocusProbe,
    ) -> bool {
        if !config.clicking_enabled || config.inspection_view_active {
            return true;
        }
        probe
            .active_window_bounds()
            .map_or(false, |bounds| bounds.contains(pointer.0, pointer.1))
    }

    /// Whether the sampled pointer pixel authorizes a click
    ///
    /// A match against either reference color authorizes; both references
    /// must be configured for the check to run at all.
    pub fn authorizes(&self, pixel: [u8; 3], config: &DetectionConfig) -> bool {
        let (Some(primary), Some(secondary)) = (config.primary, config.secondary) else {
            return false;
        };

        match config.click_method {
            ClickMethod::Lab => {
                let pixel_lab = rgb_to_lab(pixel);
                let tolerance = config.area_tolerance as f32;
                delta_e(pixel_lab, primary.lab()) <= tolerance
                    || delta_e(pixel_lab, secondary.lab()) <= tolerance
            }
            ClickMethod::Rgb => {
                rgb_within_tolerance(pixel, primary.rgb(), config.area_tolerance)
                    || rgb_within_tolerance(pixel, secondary.rgb(), config.area_tolerance)
            }
        }
    }

    /// Execute a press-then-release click if the cooldown has elapsed
    ///
    /// Returns whether a click was actually executed. Injection failures
    /// are logged and leave the cooldown untouched.
    pub fn execute(&mut self, driver: &mut dyn PointerDriver, button: MouseButton) -> bool {
        if let Some(last) = self.last_click {
            if last.elapsed() < self.cooldown {
                return false;
            }
        }

        let injected = driver.press(button).and_then(|()| driver.release(button));
        match injected {
            Ok(()) => {
                self.last_click = Some(Instant::now());
                true
            }
            Err(e) => {
                warn!(error = %e, "click injection failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceColor;
    use crate::error::{Result, SentryError};
    use crate::input::{NoFocusProbe, WindowBounds};

    struct RecordingDriver {
        clicks: Vec<MouseButton>,
        fail: bool,
    }

    impl RecordingDriver {
        fn new() -> Self {
            Self {
                clicks: Vec::new(),
                fail: false,
            }
        }
    }

    impl PointerDriver for RecordingDriver {
        fn position(&mut self) -> Option<(i32, i32)> {
            Some((0, 0))
        }

        fn press(&mut self, button: MouseButton) -> Result<()> {
            if self.fail {
                return Err(SentryError::injection("scripted failure"));
            }
            self.clicks.push(button);
            Ok(())
        }

        fn release(&mut self, _button: MouseButton) -> Result<()> {
            if self.fail {
                return Err(SentryError::injection("scripted failure"));
            }
            Ok(())
        }
    }

    struct FixedProbe(WindowBounds);

    impl FocusProbe for FixedProbe {
        fn active_window_bounds(&self) -> Option<WindowBounds> {
            Some(self.0)
        }
    }

    fn config_with_refs(method: ClickMethod) -> DetectionConfig {
        DetectionConfig {
            click_method: method,
            area_tolerance: 10,
            primary: Some(ReferenceColor::new([255, 0, 0])),
            secondary: Some(ReferenceColor::new([0, 0, 255])),
            ..DetectionConfig::default()
        }
    }

    #[test]
    fn test_suppressed_when_clicking_disabled() {
        let engine = DecisionEngine::new();
        let mut config = config_with_refs(ClickMethod::Lab);
        config.clicking_enabled = false;
        assert!(engine.suppressed(&config, (10, 10), &NoFocusProbe));
    }

    #[test]
    fn test_suppressed_while_inspection_view_open() {
        let engine = DecisionEngine::new();
        let mut config = config_with_refs(ClickMethod::Lab);
        config.inspection_view_active = true;
        assert!(engine.suppressed(&config, (10, 10), &NoFocusProbe));
    }

    #[test]
    fn test_suppressed_over_own_window() {
        let engine = DecisionEngine::new();
        let config = config_with_refs(ClickMethod::Lab);
        let probe = FixedProbe(WindowBounds {
            x: 0,
            y: 0,
            width: 100,
            height: 100,
        });
        assert!(engine.suppressed(&config, (50, 50), &probe));
        assert!(!engine.suppressed(&config, (500, 50), &probe));
    }

    #[test]
    fn test_authorizes_lab_match_on_either_reference() {
        let engine = DecisionEngine::new();
        let config = config_with_refs(ClickMethod::Lab);
        assert!(engine.authorizes([255, 0, 0], &config));
        assert!(engine.authorizes([0, 0, 255], &config));
        assert!(engine.authorizes([250, 5, 5], &config));
        assert!(!engine.authorizes([0, 255, 0], &config));
    }

    #[test]
    fn test_authorizes_rgb_method() {
        let engine = DecisionEngine::new();
        let config = config_with_refs(ClickMethod::Rgb);
        assert!(engine.authorizes([250, 5, 5], &config));
        assert!(!engine.authorizes([240, 12, 0], &config));
    }

    #[test]
    fn test_no_authorization_without_references() {
        let engine = DecisionEngine::new();
        let mut config = config_with_refs(ClickMethod::Lab);
        config.primary = None;
        assert!(!engine.authorizes([255, 0, 0], &config));
    }

    #[test]
    fn test_cooldown_blocks_second_click() {
        let mut engine = DecisionEngine::with_cooldown(Duration::from_millis(50));
        let mut driver = RecordingDriver::new();

        assert!(engine.execute(&mut driver, MouseButton::Left));
        assert!(!engine.execute(&mut driver, MouseButton::Left));
        assert_eq!(driver.clicks.len(), 1);

        std::thread::sleep(Duration::from_millis(60));
        assert!(engine.execute(&mut driver, MouseButton::Left));
        assert_eq!(driver.clicks.len(), 2);
    }

    #[test]
    fn test_failed_injection_does_not_advance_cooldown() {
        let mut engine = DecisionEngine::with_cooldown(Duration::from_millis(50));
        let mut driver = RecordingDriver::new();
        driver.fail = true;

        assert!(!engine.execute(&mut driver, MouseButton::Left));
        driver.fail = false;
        // The failed attempt consumed no cooldown window.
        assert!(engine.execute(&mut driver, MouseButton::Left));
    }

    #[test]
    fn test_configured_button_is_used() {
        let mut engine = DecisionEngine::with_cooldown(Duration::ZERO);
        let mut driver = RecordingDriver::new();
        engine.execute(&mut driver, MouseButton::Middle);
        assert_eq!(driver.clicks, vec![MouseButton::Middle]);
    }
}
