//! Session state machine vocabulary and caller-facing events.

use serde::{Deserialize, Serialize};

/// Explicit state of a capture session.
///
/// Two independent suspend axes feed this machine: the host lifecycle
/// (full hardware teardown, `* -> Idle`) and caller commands (lightweight
/// analyzer detach, `-> Paused`/`-> Captured`). `Disposed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    /// No camera binding. `startCamera` (or a foreground signal) arms.
    Idle,
    /// Camera bound, analyzer attached, accepting frames.
    Armed,
    /// A decode succeeded; analyzer detached pending caller `resume`.
    /// The hardware binding is retained.
    Captured,
    /// Caller suspended scanning; hardware stays bound, cheap to resume.
    Paused,
    /// All resources released. No transitions out.
    Disposed,
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ScanState::Idle => "idle",
            ScanState::Armed => "armed",
            ScanState::Captured => "captured",
            ScanState::Paused => "paused",
            ScanState::Disposed => "disposed",
        };
        write!(f, "{}", label)
    }
}

/// Events emitted to the caller's execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Camera bound successfully and frames are flowing.
    CameraReady,
    /// Camera binding failed; `startCamera` may be retried.
    CameraError,
    /// First successful decode since arming; payload text attached.
    Captured(String),
}

/// Host lifecycle signals forwarded by the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Application moved to the foreground; rebind the camera if idle.
    Foregrounded,
    /// Application moved to the background; fully unbind the camera.
    Backgrounded,
}
