//! scansnap
//!
//! Camera capture and multi-format optical code decode pipeline.
//!
//! The crate scans live camera frames and static images for 1D/2D optical
//! codes (QR, Code 128, EAN-13, Data Matrix) and reports the first
//! successfully decoded payload. The session layer lives here:
//!
//! - [`CaptureSession`]: binds a camera to the analyzer, owns the scan-once
//!   debounce and the pause/resume state machine
//! - [`SessionOrchestrator`]: the external-facing controller wiring caller
//!   commands and host lifecycle signals into session transitions
//! - [`Haptics`]: feedback seam pulsed on successful decodes
//!
//! Core types come from `scan-core`; pixel conversion and the dual-engine
//! decode policy from `scan-engine`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scansnap::{CaptureSession, ScanConfig, SessionOrchestrator};
//!
//! let config = ScanConfig::default();
//! let engine = Arc::new(scan_engine::DecodeEngine::new(&config.symbologies));
//! let (session, mut events) =
//!     CaptureSession::new(camera, engine.clone(), haptics.clone(), config.clone());
//! let orchestrator = SessionOrchestrator::new(session, engine, haptics, config);
//! orchestrator.dispatch("startCamera", &serde_json::Value::Null).await?;
//! ```

pub mod config;
pub mod haptics;
mod orchestrator;
mod session;

pub use config::ScanConfig;
pub use haptics::{Haptics, NoopHaptics};
pub use orchestrator::SessionOrchestrator;
pub use session::CaptureSession;

pub use scan_core::{
    frame_channel, CameraDevice, DecodeOutcome, Frame, FrameSink, FrameSource, LifecycleEvent,
    LuminanceSource, ScanError, ScanEvent, ScanResult, ScanState,
};
pub use scan_engine::{DecodeEngine, Symbology};
