//! The detection loop
//!
//! Ties the whole pipeline together on a dedicated thread: drain commands,
//! snapshot configuration, sample the pointer pixel, evaluate the click
//! decision, sample the capture box, classify, publish. Each tick sleeps
//! away whatever remains of its budget; an overrunning tick simply runs
//! back-to-back. The loop never terminates on its own: tick-level failures
//! are reported through the result channel and the loop backs off briefly
//! and resumes, until the owner signals stop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::capture::{capture_box_rect, pointer_pixel_rect, FrameSource};
use crate::classify::{classify, AreaStats};
use crate::color::DominantColorExtractor;
use crate::config::{DetectionConfig, SharedConfig};
use crate::constants::timing;
use crate::engine::channel::{AreaUpdate, LoopMessage, ResultPublisher};
use crate::engine::command::{self, CommandReceiver};
use crate::engine::decision::DecisionEngine;
use crate::input::{FocusProbe, PointerDriver};

/// What a tick did, deciding the follow-up sleep
enum TickFlow {
    /// Full pipeline ran; sleep the remainder of the tick budget
    Ran,
    /// Paused or picker active; poll again after the idle interval
    Idle,
}

/// The detection loop, generic over its boundary implementations
pub struct DetectionLoop<S, D, P>
where
    S: FrameSource + Send + 'static,
    D: PointerDriver + Send + 'static,
    P: FocusProbe + Send + 'static,
{
    config: SharedConfig,
    source: S,
    driver: D,
    probe: P,
    publisher: ResultPublisher,
    commands: CommandReceiver,
    engine: DecisionEngine,
    extractor: DominantColorExtractor,
    tick_interval: Duration,
}

impl<S, D, P> DetectionLoop<S, D, P>
where
    S: FrameSource + Send + 'static,
    D: PointerDriver + Send + 'static,
    P: FocusProbe + Send + 'static,
{
    /// Assemble a loop from its collaborators
    pub fn new(
        config: SharedConfig,
        source: S,
        driver: D,
        probe: P,
        publisher: ResultPublisher,
        commands: CommandReceiver,
    ) -> Self {
        Self {
            config,
            source,
            driver,
            probe,
            publisher,
            commands,
            engine: DecisionEngine::new(),
            extractor: DominantColorExtractor::new(),
            tick_interval: timing::TICK_INTERVAL,
        }
    }

    /// Override the tick budget (tests use a coarser cadence)
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Override the click cooldown
    pub fn with_decision_engine(mut self, engine: DecisionEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Start the loop on its own thread
    pub fn start(self) -> LoopHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || self.run(&flag));
        LoopHandle { stop, thread }
    }

    fn run(mut self, stop: &AtomicBool) {
        info!("detection loop started");
        while !stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            let outcome = catch_unwind(AssertUnwindSafe(|| self.tick()));
            match outcome {
                Ok(TickFlow::Ran) => {
                    if let Some(remaining) = self.tick_interval.checked_sub(started.elapsed()) {
                        thread::sleep(remaining);
                    }
                }
                Ok(TickFlow::Idle) => thread::sleep(timing::PAUSED_POLL_INTERVAL),
                Err(payload) => {
                    let message = panic_message(payload);
                    warn!(message = %message, "tick failed, backing off");
                    self.publisher.publish(LoopMessage::Error { message });
                    thread::sleep(timing::ERROR_BACKOFF);
                }
            }
        }
        // Dropping `self` here releases the capture and input backends.
        info!("detection loop stopped");
    }

    fn tick(&mut self) -> TickFlow {
        while let Ok(cmd) = self.commands.try_recv() {
            command::apply(&self.config, cmd);
        }

        let snapshot = self.config.snapshot();
        if snapshot.paused || snapshot.picker_active {
            return TickFlow::Idle;
        }

        let Some(pointer) = self.driver.position() else {
            debug!("pointer position unavailable, tick has no sample");
            self.publisher.publish(LoopMessage::PointerPixel { rgb: None });
            return TickFlow::Ran;
        };
        let screen = self.source.screen_size();

        let mut pointer_rgb = None;
        let mut authorized = false;
        if !self.engine.suppressed(&snapshot, pointer, &self.probe) {
            pointer_rgb = pointer_pixel_rect(pointer.0, pointer.1, screen)
                .and_then(|rect| self.source.grab(rect))
                .and_then(|raster| raster.pixels().next().map(|p| p.0));
            if let Some(rgb) = pointer_rgb {
                authorized = self.engine.authorizes(rgb, &snapshot);
            }
        }
        self.publisher
            .publish(LoopMessage::PointerPixel { rgb: pointer_rgb });

        if authorized {
            self.engine.execute(&mut self.driver, snapshot.click_button);
        }

        let update = self.area_update(pointer, screen, &snapshot);
        self.publisher.publish(LoopMessage::Area(update));

        TickFlow::Ran
    }

    /// Sample and classify the capture box
    fn area_update(
        &mut self,
        pointer: (i32, i32),
        screen: (u32, u32),
        snapshot: &DetectionConfig,
    ) -> AreaUpdate {
        let raster = capture_box_rect(pointer.0, pointer.1, snapshot.capture_box_size, screen)
            .and_then(|rect| self.source.grab(rect));
        let Some(raster) = raster else {
            return AreaUpdate::empty();
        };

        let computed = catch_unwind(AssertUnwindSafe(|| {
            let (stats, overlay) = match (snapshot.primary, snapshot.secondary) {
                (Some(primary), Some(secondary)) => {
                    let result = classify(
                        &raster,
                        primary.lab(),
                        secondary.lab(),
                        snapshot.area_tolerance as f32,
                    );
                    (result.stats, result.overlay)
                }
                _ => (AreaStats::no_reference(), None),
            };
            let dominant = if snapshot.inspection_view_active {
                self.extractor.extract(&raster)
            } else {
                Vec::new()
            };
            (stats, overlay, dominant)
        }));

        match computed {
            Ok((stats, overlay, dominant)) => AreaUpdate {
                stats,
                capture: Some(raster),
                overlay,
                dominant,
            },
            Err(payload) => {
                warn!(message = %panic_message(payload), "area classification failed");
                AreaUpdate::compute_error()
            }
        }
    }
}

/// Owner's handle to a running loop
pub struct LoopHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl LoopHandle {
    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Signal stop and wait up to the join timeout for the loop to exit
    ///
    /// Returns whether the loop thread actually finished; on timeout the
    /// thread is detached and left to exit on its next tick boundary.
    pub fn stop(self) -> bool {
        self.request_stop();
        let deadline = Instant::now() + timing::STOP_JOIN_TIMEOUT;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                warn!("detection loop did not exit within the join timeout, detaching");
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        self.thread.join().is_ok()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unidentified tick panic".to_string()
    }
}
