//! Mock camera with scripted frame delivery and call accounting.

use async_trait::async_trait;
use parking_lot::Mutex;
use scan_core::{CameraDevice, Frame, FrameSink, ScanError, ScanResult};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Configuration for the mock camera.
#[derive(Debug, Clone, Deserialize)]
pub struct MockCameraConfig {
    /// Frame width in pixels (default: 1280)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Frame height in pixels (default: 720)
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}

impl Default for MockCameraConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

struct Inner {
    config: MockCameraConfig,
    sink: Mutex<Option<FrameSink>>,
    bind_calls: AtomicU64,
    unbind_calls: AtomicU64,
    torch_on: AtomicBool,
    torch_calls: AtomicU64,
    fail_bind: AtomicBool,
    /// Frames handed out whose buffers have not been reclaimed yet.
    outstanding: Arc<AtomicI64>,
}

/// Camera double: frames are pushed by the test instead of captured.
#[derive(Clone)]
pub struct MockCamera {
    inner: Arc<Inner>,
}

impl MockCamera {
    /// Mock camera with the default 1280x720 stream.
    pub fn new() -> Self {
        Self::with_config(MockCameraConfig::default())
    }

    /// Mock camera with an explicit stream configuration.
    pub fn with_config(config: MockCameraConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                sink: Mutex::new(None),
                bind_calls: AtomicU64::new(0),
                unbind_calls: AtomicU64::new(0),
                torch_on: AtomicBool::new(false),
                torch_calls: AtomicU64::new(0),
                fail_bind: AtomicBool::new(false),
                outstanding: Arc::new(AtomicI64::new(0)),
            }),
        }
    }

    /// Make the next `bind` calls fail with a bind error.
    pub fn set_fail_bind(&self, fail: bool) {
        self.inner.fail_bind.store(fail, Ordering::SeqCst);
    }

    /// Deliver one luminance frame as if captured by hardware.
    ///
    /// The frame carries a reclaim hook so tests can assert the buffer was
    /// returned exactly once. Returns `false` when the camera is unbound.
    pub fn push_frame(&self, luma: Vec<u8>, width: u32, height: u32) -> bool {
        let sink = match self.inner.sink.lock().clone() {
            Some(sink) => sink,
            None => return false,
        };
        let outstanding = self.inner.outstanding.clone();
        outstanding.fetch_add(1, Ordering::SeqCst);
        let frame = Frame::with_reclaim(width, height, width, luma, move || {
            outstanding.fetch_sub(1, Ordering::SeqCst);
        });
        sink.offer(frame);
        true
    }

    /// Number of `bind` calls accepted so far.
    pub fn bind_count(&self) -> u64 {
        self.inner.bind_calls.load(Ordering::SeqCst)
    }

    /// Number of `unbind` calls so far.
    pub fn unbind_count(&self) -> u64 {
        self.inner.unbind_calls.load(Ordering::SeqCst)
    }

    /// Number of torch toggles that reached the hardware control.
    pub fn torch_calls(&self) -> u64 {
        self.inner.torch_calls.load(Ordering::SeqCst)
    }

    /// Current simulated torch state.
    pub fn torch_on(&self) -> bool {
        self.inner.torch_on.load(Ordering::SeqCst)
    }

    /// Frames delivered whose buffers are still out.
    pub fn outstanding_frames(&self) -> i64 {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// True while a binding exists.
    pub fn is_bound(&self) -> bool {
        self.inner.sink.lock().is_some()
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    async fn bind(&self, sink: FrameSink) -> ScanResult<()> {
        if self.inner.fail_bind.load(Ordering::SeqCst) {
            return Err(ScanError::CameraBind("mock provider unavailable".into()));
        }
        self.inner.bind_calls.fetch_add(1, Ordering::SeqCst);
        *self.inner.sink.lock() = Some(sink);
        debug!("mock camera bound");
        Ok(())
    }

    async fn unbind(&self) {
        if self.inner.sink.lock().take().is_some() {
            self.inner.unbind_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.torch_on.store(false, Ordering::SeqCst);
            debug!("mock camera unbound");
        }
    }

    async fn set_torch(&self, on: bool) -> bool {
        if self.inner.sink.lock().is_none() {
            return false;
        }
        self.inner.torch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.torch_on.store(on, Ordering::SeqCst);
        on
    }

    fn resolution(&self) -> (u32, u32) {
        (self.inner.config.width, self.inner.config.height)
    }
}
