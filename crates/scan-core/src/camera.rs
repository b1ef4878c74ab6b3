//! Camera device seam.
//!
//! The session layer drives camera hardware exclusively through this trait;
//! platform integrations and the mock driver implement it. Binding hands the
//! device a [`FrameSink`] to feed from its own capture thread, decoupled from
//! the analyzer.

use crate::error::ScanResult;
use crate::source::FrameSink;
use async_trait::async_trait;

/// A bindable camera producing luminance frames.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Bind the hardware and start feeding frames into `sink`.
    ///
    /// Returns [`crate::ScanError::CameraBind`] when the provider is
    /// unavailable; binding may be retried later.
    async fn bind(&self, sink: FrameSink) -> ScanResult<()>;

    /// Release the hardware binding. Idempotent; never fails.
    async fn unbind(&self);

    /// Forward a torch toggle to the hardware control.
    ///
    /// Returns the torch state after the call. Ignored (returns `false`)
    /// when no binding exists.
    async fn set_torch(&self, on: bool) -> bool;

    /// Stream resolution in pixels (width, height).
    fn resolution(&self) -> (u32, u32);
}
