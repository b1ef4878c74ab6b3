//! Keep-only-latest frame slot between a camera feed and one analyzer.
//!
//! The producer side ([`FrameSink`]) never queues more than one pending
//! frame: while the consumer is busy, a newly offered frame replaces the
//! pending one and the replaced frame is released immediately. The pipeline
//! therefore never falls behind; it only skips frames under momentary load,
//! which is acceptable because scanning needs the first successful decode,
//! not exhaustive coverage.

use crate::data::Frame;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::trace;

struct Shared {
    slot: Mutex<Option<Frame>>,
    notify: Notify,
    /// Analyzer attached. When false, offered frames are dropped at the door.
    active: AtomicBool,
    closed: AtomicBool,
    dropped: AtomicU64,
}

/// Create a connected sink/source pair.
///
/// The source starts detached; call [`FrameSink::set_active`] once the
/// analyzer should receive frames.
pub fn frame_channel() -> (FrameSink, FrameSource) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        notify: Notify::new(),
        active: AtomicBool::new(false),
        closed: AtomicBool::new(false),
        dropped: AtomicU64::new(0),
    });
    (
        FrameSink {
            shared: shared.clone(),
        },
        FrameSource { shared },
    )
}

/// Producer handle fed by the camera's capture thread.
///
/// Cloneable; the session layer keeps a clone for attach/detach control.
#[derive(Clone)]
pub struct FrameSink {
    shared: Arc<Shared>,
}

impl FrameSink {
    /// Offer a frame, replacing any pending one.
    ///
    /// The replaced (or refused) frame is dropped here, which releases its
    /// buffer back to the camera on this call path.
    pub fn offer(&self, frame: Frame) {
        if self.shared.closed.load(Ordering::Acquire) {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        // The active check runs under the slot lock so a concurrent detach
        // cannot clear the slot and then observe this frame landing in it.
        let mut slot = self.shared.slot.lock();
        if !self.shared.active.load(Ordering::Acquire) {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let replaced = slot.replace(frame);
        drop(slot);
        if replaced.is_some() {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            trace!("replacing pending frame (consumer busy)");
        }
        self.shared.notify.notify_one();
    }

    /// Attach or detach the analyzer.
    ///
    /// Detaching clears any pending frame so a stale buffer is never decoded
    /// after a later reattach.
    pub fn set_active(&self, active: bool) {
        let mut slot = self.shared.slot.lock();
        self.shared.active.store(active, Ordering::Release);
        if !active {
            slot.take();
        }
    }

    /// True when the analyzer is attached.
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    /// Shut the channel; the consumer drains the pending frame then ends.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }

    /// Number of frames dropped by the backpressure policy so far.
    pub fn dropped_frames(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

/// Single consumer side; not cloneable.
pub struct FrameSource {
    shared: Arc<Shared>,
}

impl FrameSource {
    /// Wait for the next frame. Returns `None` once the channel is closed
    /// and the pending frame (if any) has been drained.
    pub async fn next(&mut self) -> Option<Frame> {
        loop {
            if let Some(frame) = self.shared.slot.lock().take() {
                return Some(frame);
            }
            if self.shared.closed.load(Ordering::Acquire) {
                return None;
            }
            self.shared.notify.notified().await;
        }
    }
}
