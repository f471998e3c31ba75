//! Detection configuration: reference colors, runtime settings, persistence
//!
//! The control surface owns a [`SharedConfig`]; the detection loop holds a
//! handle and takes a whole-snapshot copy at the top of every tick, so
//! operator edits mid-tick never produce a torn read. Persistence is a flat
//! JSON record with per-field fallback: a missing or malformed field falls
//! back to its documented default without discarding the rest of the file.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use palette::Lab;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::color::conversion::rgb_to_lab;
use crate::constants::{defaults, limits};
use crate::error::{Result, SentryError};
use crate::input::MouseButton;

/// Color distance method used for the click decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClickMethod {
    /// Per-channel RGB tolerance; cheap, less perceptually accurate
    #[serde(rename = "RGB")]
    Rgb,
    /// Euclidean Lab distance (ΔE); perceptual, the default
    #[serde(rename = "LAB")]
    #[default]
    Lab,
}

/// An operator-chosen reference color
///
/// RGB is the source of truth; the Lab value is derived on construction and
/// can only change by constructing a new reference, so the pair can never
/// drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceColor {
    rgb: [u8; 3],
    lab: Lab,
}

impl ReferenceColor {
    /// Create a reference color, deriving its Lab representation
    pub fn new(rgb: [u8; 3]) -> Self {
        Self {
            rgb,
            lab: rgb_to_lab(rgb),
        }
    }

    /// The RGB triple
    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    /// The derived Lab value
    pub fn lab(&self) -> Lab {
        self.lab
    }
}

/// Mutable runtime configuration, shared between control surface and loop
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Area tolerance: ΔE units for LAB matching, channel units for RGB
    pub area_tolerance: u8,
    /// Capture box edge length in pixels
    pub capture_box_size: u32,
    /// Distance method for the click decision
    pub click_method: ClickMethod,
    /// Button pressed by the synthetic click
    pub click_button: MouseButton,
    /// Master switch for click execution
    pub clicking_enabled: bool,
    /// While paused the loop samples nothing
    pub paused: bool,
    /// While a picker overlay is open the loop skips sampling entirely
    pub picker_active: bool,
    /// While the inspection view is open, clicks are suppressed and
    /// dominant colors are computed
    pub inspection_view_active: bool,
    /// Primary reference color
    pub primary: Option<ReferenceColor>,
    /// Secondary reference color
    pub secondary: Option<ReferenceColor>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            area_tolerance: defaults::AREA_TOLERANCE,
            capture_box_size: defaults::CAPTURE_BOX_SIZE,
            click_method: ClickMethod::default(),
            click_button: MouseButton::default(),
            clicking_enabled: defaults::CLICKING_ENABLED,
            paused: true,
            picker_active: false,
            inspection_view_active: false,
            primary: Some(ReferenceColor::new(defaults::PRIMARY_COLOR_RGB)),
            secondary: Some(ReferenceColor::new(defaults::SECONDARY_COLOR_RGB)),
        }
    }
}

impl DetectionConfig {
    /// Build a runtime configuration from a persisted record
    ///
    /// Out-of-range values are clamped into their documented limits; Lab
    /// values are re-derived from the stored RGB.
    pub fn from_persisted(persisted: &PersistedConfig) -> Self {
        Self {
            area_tolerance: clamp_tolerance(persisted.area_tolerance),
            capture_box_size: clamp_box_size(persisted.capture_box_size),
            click_method: persisted.click_method,
            click_button: persisted.click_button,
            clicking_enabled: persisted.clicking_enabled,
            primary: Some(ReferenceColor::new(persisted.color1_rgb)),
            secondary: Some(ReferenceColor::new(persisted.color2_rgb)),
            ..Self::default()
        }
    }
}

fn clamp_tolerance(value: u8) -> u8 {
    value.clamp(limits::TOLERANCE_MIN, limits::TOLERANCE_MAX)
}

fn clamp_box_size(value: u32) -> u32 {
    value.clamp(limits::BOX_SIZE_MIN, limits::BOX_SIZE_MAX)
}

/// Mutual-exclusion wrapper around the shared [`DetectionConfig`]
///
/// All cross-thread access goes through this handle. Setters clamp their
/// input and hold the lock only for the assignment; the loop reads one
/// whole-config snapshot per tick.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<Mutex<DetectionConfig>>,
}

impl SharedConfig {
    /// Wrap a configuration for sharing
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DetectionConfig> {
        // A panicked writer leaves the config intact; keep serving it.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy the full configuration for one tick
    pub fn snapshot(&self) -> DetectionConfig {
        self.lock().clone()
    }

    /// Set the area tolerance, clamped to its valid range
    pub fn set_area_tolerance(&self, value: u8) {
        self.lock().area_tolerance = clamp_tolerance(value);
    }

    /// Set the capture box size, clamped to its valid range
    pub fn set_capture_box_size(&self, value: u32) {
        self.lock().capture_box_size = clamp_box_size(value);
    }

    /// Select the click decision method
    pub fn set_click_method(&self, method: ClickMethod) {
        self.lock().click_method = method;
    }

    /// Select the synthetic click button
    pub fn set_click_button(&self, button: MouseButton) {
        self.lock().click_button = button;
    }

    /// Enable or disable click execution
    pub fn set_clicking_enabled(&self, enabled: bool) {
        self.lock().clicking_enabled = enabled;
    }

    /// Flip the clicking-enabled flag, returning the new value
    pub fn toggle_clicking(&self) -> bool {
        let mut config = self.lock();
        config.clicking_enabled = !config.clicking_enabled;
        config.clicking_enabled
    }

    /// Pause or resume the loop
    pub fn set_paused(&self, paused: bool) {
        self.lock().paused = paused;
    }

    /// Flip the pause flag, returning the new value
    pub fn toggle_paused(&self) -> bool {
        let mut config = self.lock();
        config.paused = !config.paused;
        config.paused
    }

    /// Mark a color-picker overlay as open or closed
    pub fn set_picker_active(&self, active: bool) {
        self.lock().picker_active = active;
    }

    /// Mark the detected-colors inspection view as open or closed
    pub fn set_inspection_view_active(&self, active: bool) {
        self.lock().inspection_view_active = active;
    }

    /// Set the primary reference color from RGB, re-deriving Lab
    pub fn set_primary_color(&self, rgb: [u8; 3]) {
        self.lock().primary = Some(ReferenceColor::new(rgb));
    }

    /// Set the secondary reference color from RGB, re-deriving Lab
    pub fn set_secondary_color(&self, rgb: [u8; 3]) {
        self.lock().secondary = Some(ReferenceColor::new(rgb));
    }
}

/// Flat persisted configuration record
///
/// Field names match the on-disk JSON produced by earlier versions of the
/// tool, including the two hotkey descriptors consumed by the control
/// surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedConfig {
    pub color1_rgb: [u8; 3],
    pub color2_rgb: [u8; 3],
    pub area_tolerance: u8,
    pub capture_box_size: u32,
    pub click_method: ClickMethod,
    pub click_button: MouseButton,
    pub clicking_enabled: bool,
    pub pause_hotkey: String,
    pub toggle_click_hotkey: String,
}

impl Default for PersistedConfig {
    fn default() -> Self {
        Self {
            color1_rgb: defaults::PRIMARY_COLOR_RGB,
            color2_rgb: defaults::SECONDARY_COLOR_RGB,
            area_tolerance: defaults::AREA_TOLERANCE,
            capture_box_size: defaults::CAPTURE_BOX_SIZE,
            click_method: ClickMethod::default(),
            click_button: MouseButton::default(),
            clicking_enabled: defaults::CLICKING_ENABLED,
            pause_hotkey: defaults::PAUSE_HOTKEY.to_string(),
            toggle_click_hotkey: defaults::TOGGLE_CLICK_HOTKEY.to_string(),
        }
    }
}

impl PersistedConfig {
    /// Capture the persistable subset of a runtime configuration
    pub fn from_detection(config: &DetectionConfig) -> Self {
        let fallback = Self::default();
        Self {
            color1_rgb: config
                .primary
                .map(|c| c.rgb())
                .unwrap_or(fallback.color1_rgb),
            color2_rgb: config
                .secondary
                .map(|c| c.rgb())
                .unwrap_or(fallback.color2_rgb),
            area_tolerance: config.area_tolerance,
            capture_box_size: config.capture_box_size,
            click_method: config.click_method,
            click_button: config.click_button,
            clicking_enabled: config.clicking_enabled,
            ..fallback
        }
    }

    /// Build a record from a parsed JSON value with per-field defaulting
    ///
    /// Every field that is missing or fails to deserialize falls back to
    /// its default individually; a warning names the field.
    pub fn from_json_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                warn!(found = %json_kind(&other), "config is not a JSON object, using defaults");
                return Self::default();
            }
        };

        let fallback = Self::default();
        Self {
            color1_rgb: take_field(&mut map, "color1_rgb", fallback.color1_rgb),
            color2_rgb: take_field(&mut map, "color2_rgb", fallback.color2_rgb),
            area_tolerance: take_field(&mut map, "area_tolerance", fallback.area_tolerance),
            capture_box_size: take_field(&mut map, "capture_box_size", fallback.capture_box_size),
            click_method: take_field(&mut map, "click_method", fallback.click_method),
            click_button: take_field(&mut map, "click_button", fallback.click_button),
            clicking_enabled: take_field(&mut map, "clicking_enabled", fallback.clicking_enabled),
            pause_hotkey: take_field(&mut map, "pause_hotkey", fallback.pause_hotkey),
            toggle_click_hotkey: take_field(
                &mut map,
                "toggle_click_hotkey",
                fallback.toggle_click_hotkey,
            ),
        }
    }

    /// Parse a record from JSON text
    ///
    /// # Errors
    ///
    /// Returns `SentryError::Config` when the text is not valid JSON at
    /// all; individual bad fields are defaulted, not errors.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SentryError::config("config is not valid JSON", e))?;
        Ok(Self::from_json_value(value))
    }

    /// Load a record from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `SentryError::Config` when the file cannot be read or is
    /// not valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SentryError::config(format!("could not read {}", path.display()), e))?;
        Self::from_json_str(&content)
    }

    /// Save the record as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `SentryError::Config` when the file cannot be written.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SentryError::config("could not serialize config", e))?;
        std::fs::write(path, json)
            .map_err(|e| SentryError::config(format!("could not write {}", path.display()), e))
    }
}

fn take_field<T: serde::de::DeserializeOwned>(
    map: &mut serde_json::Map<String, Value>,
    key: &str,
    fallback: T,
) -> T {
    match map.remove(key) {
        None => fallback,
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(field = key, error = %e, "malformed config field, using default");
                fallback
            }
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
