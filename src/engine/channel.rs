//! Bounded result hand-off from the detection loop to the presentation side
//!
//! The loop publishes without ever blocking: when the channel is full the
//! oldest unread message is dropped to admit the new one, so a slow or
//! stalled consumer costs freshness, never loop latency. The consumer
//! drains everything queued per call on its own coarser cadence.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use image::RgbImage;
use tracing::trace;

use crate::classify::AreaStats;
use crate::color::DominantColorEntry;
use crate::constants::channel;

/// One message from the loop to the presentation layer
#[derive(Debug, Clone)]
pub enum LoopMessage {
    /// The pixel under the pointer, absent when it was not sampled
    PointerPixel { rgb: Option<[u8; 3]> },
    /// Area statistics and feedback rasters for one tick
    Area(AreaUpdate),
    /// A recovered tick-level error, for operator display
    Error { message: String },
}

/// Classification artifacts of one tick
#[derive(Debug, Clone)]
pub struct AreaUpdate {
    /// Readings for both reference colors
    pub stats: AreaStats,
    /// The captured box raster, absent when capture produced no sample
    pub capture: Option<RgbImage>,
    /// Marker overlay, absent without a capture or reference colors
    pub overlay: Option<RgbImage>,
    /// Dominant-color palette; empty unless the inspection view is open
    pub dominant: Vec<DominantColorEntry>,
}

impl AreaUpdate {
    /// Update for a tick with no capture sample
    pub fn empty() -> Self {
        Self {
            stats: AreaStats::empty(),
            capture: None,
            overlay: None,
            dominant: Vec::new(),
        }
    }

    /// Update for a tick whose classification failed
    pub fn compute_error() -> Self {
        Self {
            stats: AreaStats::compute_error(),
            capture: None,
            overlay: None,
            dominant: Vec::new(),
        }
    }
}

/// Create a bounded result channel with the default capacity
pub fn result_channel() -> (ResultPublisher, ResultConsumer) {
    result_channel_with_capacity(channel::RESULT_CAPACITY)
}

/// Create a bounded result channel with an explicit capacity
pub fn result_channel_with_capacity(capacity: usize) -> (ResultPublisher, ResultConsumer) {
    let (tx, rx) = bounded(capacity);
    (
        ResultPublisher {
            tx,
            overflow_rx: rx.clone(),
        },
        ResultConsumer { rx },
    )
}

/// Producer half held by the detection loop
pub struct ResultPublisher {
    tx: Sender<LoopMessage>,
    // Receiver clone used only to evict the oldest message on overflow.
    overflow_rx: Receiver<LoopMessage>,
}

impl ResultPublisher {
    /// Publish a message without blocking
    ///
    /// On a full channel the oldest unread message is discarded and the
    /// publish retried; with a positive capacity this terminates after at
    /// most a handful of evictions.
    pub fn publish(&self, message: LoopMessage) {
        let mut message = message;
        loop {
            match self.tx.try_send(message) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    if self.overflow_rx.try_recv().is_ok() {
                        trace!("result channel full, dropped oldest message");
                    }
                    message = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

/// Consumer half held by the presentation layer
pub struct ResultConsumer {
    rx: Receiver<LoopMessage>,
}

impl ResultConsumer {
    /// Take every currently queued message
    pub fn drain(&self) -> Vec<LoopMessage> {
        self.rx.try_iter().collect()
    }
}
