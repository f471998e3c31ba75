//! Integration tests for the complete detection loop
//!
//! These tests drive the loop end-to-end over scripted boundary
//! implementations:
//! - A fake frame source that serves known rasters and counts grabs
//! - A pinned pointer driver that records injected clicks
//! - A focus probe with fixed window bounds for the occlusion guard
//!
//! Timing assertions are deliberately loose; the loop runs on a real thread
//! and the tests only pin down ordering and bounds, not exact tick counts.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::{Rgb, RgbImage};
use pixel_sentry::engine::DecisionEngine;
use pixel_sentry::{
    command_queue, probe_pointer, result_channel, AreaReading, Command, DetectionConfig,
    DetectionLoop, FocusProbe, FrameSource, LoopMessage, MouseButton, NoFocusProbe, PixelRect,
    PointerDriver, Result, SharedConfig,
};

// ============================================================================
// Scripted Boundaries
// ============================================================================

/// Screen whose capture box is half red / half blue; the pointer pixel is
/// whatever color sits at the requested coordinate.
struct SplitScreen {
    size: (u32, u32),
    grabs: Arc<AtomicU32>,
}

impl SplitScreen {
    fn new(size: (u32, u32)) -> (Self, Arc<AtomicU32>) {
        let grabs = Arc::new(AtomicU32::new(0));
        (
            Self {
                size,
                grabs: Arc::clone(&grabs),
            },
            grabs,
        )
    }

    fn color_at(&self, x: u32) -> [u8; 3] {
        if x < self.size.0 / 2 {
            [255, 0, 0]
        } else {
            [0, 0, 255]
        }
    }
}

impl FrameSource for SplitScreen {
    fn screen_size(&self) -> (u32, u32) {
        self.size
    }

    fn grab(&mut self, rect: PixelRect) -> Option<RgbImage> {
        self.grabs.fetch_add(1, Ordering::Relaxed);
        let origin_x = rect.x;
        let colors: Vec<[u8; 3]> = (0..rect.width).map(|dx| self.color_at(origin_x + dx)).collect();
        Some(RgbImage::from_fn(rect.width, rect.height, |x, _| {
            Rgb(colors[x as usize])
        }))
    }

    fn full_frame(&mut self) -> Option<RgbImage> {
        self.grab(PixelRect {
            x: 0,
            y: 0,
            width: self.size.0,
            height: self.size.1,
        })
    }
}

/// Screen that always fails to capture
struct BlindScreen;

impl FrameSource for BlindScreen {
    fn screen_size(&self) -> (u32, u32) {
        (100, 100)
    }

    fn grab(&mut self, _rect: PixelRect) -> Option<RgbImage> {
        None
    }

    fn full_frame(&mut self) -> Option<RgbImage> {
        None
    }
}

struct PinnedDriver {
    position: (i32, i32),
    clicks: Arc<Mutex<Vec<MouseButton>>>,
}

impl PinnedDriver {
    fn new(position: (i32, i32)) -> (Self, Arc<Mutex<Vec<MouseButton>>>) {
        let clicks = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                position,
                clicks: Arc::clone(&clicks),
            },
            clicks,
        )
    }
}

impl PointerDriver for PinnedDriver {
    fn position(&mut self) -> Option<(i32, i32)> {
        Some(self.position)
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        self.clicks.lock().unwrap().push(button);
        Ok(())
    }

    fn release(&mut self, _button: MouseButton) -> Result<()> {
        Ok(())
    }
}

struct OwnWindowProbe {
    bounds: pixel_sentry::input::WindowBounds,
}

impl FocusProbe for OwnWindowProbe {
    fn active_window_bounds(&self) -> Option<pixel_sentry::input::WindowBounds> {
        Some(self.bounds)
    }
}

fn unpaused_config() -> SharedConfig {
    let mut config = DetectionConfig::default();
    config.paused = false;
    SharedConfig::new(config)
}

fn area_updates(messages: &[LoopMessage]) -> Vec<&pixel_sentry::AreaUpdate> {
    messages
        .iter()
        .filter_map(|m| match m {
            LoopMessage::Area(update) => Some(update),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Classification Scenarios
// ============================================================================

#[test]
fn test_half_red_half_blue_scenario() {
    // References red and blue, tolerance 10, pointer centered: the capture
    // box splits 50/50 and the overlay leaves no pixel unmarked.
    let config = unpaused_config();
    config.set_primary_color([255, 0, 0]);
    config.set_secondary_color([0, 0, 255]);
    config.set_area_tolerance(10);
    config.set_capture_box_size(100);
    config.set_clicking_enabled(false);

    let (screen, _) = SplitScreen::new((1000, 1000));
    let (driver, _) = PinnedDriver::new((500, 500));
    let (publisher, consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, NoFocusProbe, publisher, command_rx)
        .with_tick_interval(Duration::from_millis(2))
        .start();
    thread::sleep(Duration::from_millis(60));
    assert!(handle.stop());

    let messages = consumer.drain();
    let updates = area_updates(&messages);
    assert!(!updates.is_empty(), "expected area updates");

    let update = updates.last().unwrap();
    match update.stats.primary {
        AreaReading::Valid { percent, count } => {
            assert!((percent - 50.0).abs() < 0.01, "primary share was {percent}");
            assert_eq!(count, 100 * 100 / 2);
        }
        other => panic!("expected valid primary reading, got {:?}", other),
    }
    match update.stats.secondary {
        AreaReading::Valid { percent, count } => {
            assert!((percent - 50.0).abs() < 0.01);
            assert_eq!(count, 100 * 100 / 2);
        }
        other => panic!("expected valid secondary reading, got {:?}", other),
    }

    let overlay = update.overlay.as_ref().expect("overlay should exist");
    for (_, _, pixel) in overlay.enumerate_pixels() {
        assert!(
            pixel.0 == [255, 0, 0] || pixel.0 == [0, 0, 255],
            "overlay pixel left unmarked: {:?}",
            pixel.0
        );
    }
}

#[test]
fn test_capture_failure_yields_empty_update() {
    let config = unpaused_config();
    config.set_clicking_enabled(false);

    let (publisher, consumer) = result_channel();
    let (_commands, command_rx) = command_queue();
    let (driver, _) = PinnedDriver::new((50, 50));

    let handle = DetectionLoop::new(config, BlindScreen, driver, NoFocusProbe, publisher, command_rx)
        .with_tick_interval(Duration::from_millis(2))
        .start();
    thread::sleep(Duration::from_millis(40));
    handle.stop();

    let messages = consumer.drain();
    let updates = area_updates(&messages);
    assert!(!updates.is_empty());
    for update in updates {
        assert!(update.capture.is_none());
        assert!(update.overlay.is_none());
        assert_eq!(update.stats.primary, AreaReading::Valid { percent: 0.0, count: 0 });
    }
    // No error messages: a capture failure is a quiet no-sample tick.
    assert!(!messages.iter().any(|m| matches!(m, LoopMessage::Error { .. })));
}

// ============================================================================
// Click Scenarios
// ============================================================================

#[test]
fn test_matching_pointer_pixel_clicks_configured_button() {
    let config = unpaused_config();
    config.set_primary_color([255, 0, 0]);
    config.set_click_button(MouseButton::Right);

    // Pointer in the red half: the pointer pixel matches the primary color.
    let (screen, _) = SplitScreen::new((1000, 1000));
    let (driver, clicks) = PinnedDriver::new((100, 500));
    let (publisher, _consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, NoFocusProbe, publisher, command_rx)
        .with_tick_interval(Duration::from_millis(2))
        .start();
    thread::sleep(Duration::from_millis(60));
    handle.stop();

    let executed = clicks.lock().unwrap();
    assert!(!executed.is_empty(), "expected at least one click");
    assert!(executed.iter().all(|&b| b == MouseButton::Right));
}

#[test]
fn test_cooldown_limits_click_rate() {
    let config = unpaused_config();
    config.set_primary_color([255, 0, 0]);

    let (screen, _) = SplitScreen::new((1000, 1000));
    let (driver, clicks) = PinnedDriver::new((100, 500));
    let (publisher, _consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, NoFocusProbe, publisher, command_rx)
        .with_tick_interval(Duration::from_millis(1))
        .with_decision_engine(DecisionEngine::with_cooldown(Duration::from_millis(50)))
        .start();
    thread::sleep(Duration::from_millis(160));
    handle.stop();

    let executed = clicks.lock().unwrap().len();
    assert!(executed >= 1);
    // ~160ms of matching ticks with a 50ms cooldown allows a handful of
    // clicks at most, far below the tick count.
    assert!(executed <= 5, "cooldown failed to limit clicks: {executed}");
}

#[test]
fn test_no_click_through_own_window() {
    let config = unpaused_config();
    config.set_primary_color([255, 0, 0]);

    let (screen, _) = SplitScreen::new((1000, 1000));
    let (driver, clicks) = PinnedDriver::new((100, 500));
    let probe = OwnWindowProbe {
        bounds: pixel_sentry::input::WindowBounds {
            x: 0,
            y: 0,
            width: 1000,
            height: 1000,
        },
    };
    let (publisher, consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, probe, publisher, command_rx)
        .with_tick_interval(Duration::from_millis(2))
        .start();
    thread::sleep(Duration::from_millis(40));
    handle.stop();

    assert!(clicks.lock().unwrap().is_empty(), "must not click own window");
    // Suppressed ticks publish an unsampled pointer pixel.
    assert!(consumer
        .drain()
        .iter()
        .all(|m| !matches!(m, LoopMessage::PointerPixel { rgb: Some(_) })));
}

#[test]
fn test_inspection_view_suppresses_clicks_and_adds_palette() {
    let config = unpaused_config();
    config.set_primary_color([255, 0, 0]);
    config.set_inspection_view_active(true);
    config.set_capture_box_size(100);

    let (screen, _) = SplitScreen::new((1000, 1000));
    let (driver, clicks) = PinnedDriver::new((100, 500));
    let (publisher, consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, NoFocusProbe, publisher, command_rx)
        .with_tick_interval(Duration::from_millis(2))
        .start();
    thread::sleep(Duration::from_millis(60));
    handle.stop();

    assert!(clicks.lock().unwrap().is_empty(), "inspection view must suppress clicks");

    let messages = consumer.drain();
    let updates = area_updates(&messages);
    let with_palette = updates.iter().filter(|u| !u.dominant.is_empty()).count();
    assert!(with_palette > 0, "inspection view should produce dominant colors");
}

// ============================================================================
// Pause / Picker Scenarios
// ============================================================================

#[test]
fn test_paused_loop_never_samples_or_clicks() {
    let config = SharedConfig::new(DetectionConfig::default());
    let (screen, grabs) = SplitScreen::new((1000, 1000));
    let (driver, clicks) = PinnedDriver::new((100, 500));
    let (publisher, consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, NoFocusProbe, publisher, command_rx).start();
    thread::sleep(Duration::from_millis(60));
    handle.stop();

    assert_eq!(grabs.load(Ordering::Relaxed), 0, "paused loop must not sample");
    assert!(clicks.lock().unwrap().is_empty());
    assert!(consumer.drain().is_empty());
}

#[test]
fn test_picker_overlay_suspends_sampling() {
    let config = unpaused_config();
    config.set_picker_active(true);

    let (screen, grabs) = SplitScreen::new((1000, 1000));
    let (driver, _) = PinnedDriver::new((100, 500));
    let (publisher, consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, NoFocusProbe, publisher, command_rx).start();
    thread::sleep(Duration::from_millis(60));
    handle.stop();

    assert_eq!(grabs.load(Ordering::Relaxed), 0, "picker must suspend sampling");
    assert!(consumer.drain().is_empty());
}

#[test]
fn test_pause_toggle_command_round_trip() {
    let config = SharedConfig::new(DetectionConfig::default());
    let (screen, _) = SplitScreen::new((1000, 1000));
    let (driver, _) = PinnedDriver::new((500, 500));
    let (publisher, consumer) = result_channel();
    let (commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(config, screen, driver, NoFocusProbe, publisher, command_rx)
        .with_tick_interval(Duration::from_millis(2))
        .start();

    commands.send(Command::TogglePause);
    thread::sleep(Duration::from_millis(250));
    let running = consumer.drain();
    assert!(!running.is_empty(), "toggling pause off should start publishing");

    commands.send(Command::TogglePause);
    thread::sleep(Duration::from_millis(250));
    consumer.drain();
    thread::sleep(Duration::from_millis(120));
    assert!(
        consumer.drain().is_empty(),
        "toggling pause back on should stop publishing"
    );
    handle.stop();
}

// ============================================================================
// Pointer Probe
// ============================================================================

#[test]
fn test_probe_pointer_reads_rgb_and_lab() {
    let (mut screen, _) = SplitScreen::new((1000, 1000));
    let (mut driver, _) = PinnedDriver::new((100, 500));

    let probe = probe_pointer(&mut screen, &mut driver).expect("probe should sample");
    assert_eq!(probe.position, (100, 500));
    assert_eq!(probe.rgb, [255, 0, 0]);
    assert!(probe.lab.a > 40.0, "red has strongly positive a*");
}

#[test]
fn test_probe_pointer_without_capture() {
    let (mut driver, _) = PinnedDriver::new((100, 500));
    assert!(probe_pointer(&mut BlindScreen, &mut driver).is_none());
}
