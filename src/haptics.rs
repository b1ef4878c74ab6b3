//! Haptic feedback seam.
//!
//! The pipeline pulses the host's vibration service on every successful
//! decode, live or static. Platform embedders provide the implementation;
//! the default is a no-op.

use std::time::Duration;

/// Length of the confirmation pulse fired on a successful decode.
pub const CAPTURE_PULSE: Duration = Duration::from_millis(50);

/// Host vibration service.
pub trait Haptics: Send + Sync {
    /// Fire a single pulse of the given duration.
    ///
    /// Must not block; implementations hand off to the platform service.
    fn pulse(&self, duration: Duration);
}

/// Haptics for hosts without a vibration service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn pulse(&self, _duration: Duration) {}
}
