//! `scan-core`
//!
//! Core trait definitions and types for the scansnap capture pipeline.
//!
//! This crate provides the fundamental building blocks shared by the decode
//! engines, the camera drivers, and the session layer:
//!
//! - [`Frame`]: one camera buffer with a release-exactly-once reclaim contract
//! - [`LuminanceSource`]: owned single-channel view consumed by the decoders
//! - [`DecodeOutcome`]: decoded text or nothing, no partial state
//! - [`ScanState`]: explicit state machine for the capture session lifecycle
//! - [`CameraDevice`]: the seam between the session layer and camera hardware
//! - [`frame_channel`]: the keep-only-latest frame slot between a camera feed
//!   and the single analyzer consumer

pub mod camera;
pub mod data;
pub mod error;
pub mod source;
pub mod state;

pub use camera::CameraDevice;
pub use data::{DecodeOutcome, Frame, LuminanceSource};
pub use error::{ScanError, ScanResult};
pub use source::{frame_channel, FrameSink, FrameSource};
pub use state::{LifecycleEvent, ScanEvent, ScanState};
