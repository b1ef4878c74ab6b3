//! Caller-facing command surface.
//!
//! The orchestrator translates the host's string-keyed commands into typed
//! session and engine calls, mirroring the embedder's channel protocol:
//! unknown methods and missing arguments are reported as typed errors, and
//! static-image decode misses come back as a null payload rather than a
//! fault.

use crate::config::ScanConfig;
use crate::haptics::{Haptics, CAPTURE_PULSE};
use crate::session::CaptureSession;
use scan_core::{
    CameraDevice, DecodeOutcome, LifecycleEvent, ScanError, ScanEvent, ScanResult,
};
use scan_engine::DecodeEngine;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Command router over one capture session and one decode engine.
pub struct SessionOrchestrator {
    session: Arc<CaptureSession>,
    engine: Arc<DecodeEngine>,
    haptics: Arc<dyn Haptics>,
    config: ScanConfig,
}

impl SessionOrchestrator {
    pub fn new(
        session: Arc<CaptureSession>,
        engine: Arc<DecodeEngine>,
        haptics: Arc<dyn Haptics>,
        config: ScanConfig,
    ) -> Self {
        Self {
            session,
            engine,
            haptics,
            config,
        }
    }

    /// Wire up an engine, session, and orchestrator in one step.
    ///
    /// Returns the orchestrator plus the session's event stream.
    pub fn build(
        camera: Arc<dyn CameraDevice>,
        haptics: Arc<dyn Haptics>,
        config: ScanConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
        let engine = Arc::new(DecodeEngine::new(&config.symbologies));
        let (session, events) =
            CaptureSession::new(camera, engine.clone(), haptics.clone(), config.clone());
        (Self::new(session, engine, haptics, config), events)
    }

    /// The session this orchestrator drives.
    pub fn session(&self) -> &Arc<CaptureSession> {
        &self.session
    }

    /// Execute one caller command.
    ///
    /// `args` is the raw argument value from the host channel; commands
    /// taking no arguments ignore it.
    pub async fn dispatch(&self, method: &str, args: &Value) -> ScanResult<Value> {
        debug!(method, "dispatching command");
        // Session commands on a disposed session are structural misuse;
        // `dispose` stays idempotent and `parse` is camera-independent.
        if self.session.state() == scan_core::ScanState::Disposed
            && matches!(method, "startCamera" | "resume" | "pause" | "toggleTorch")
        {
            return Err(ScanError::Disposed);
        }
        match method {
            "startCamera" => {
                self.session.start_camera().await;
                Ok(Value::Null)
            }
            "resume" => {
                self.session.resume();
                Ok(Value::Null)
            }
            "pause" => {
                self.session.pause();
                Ok(Value::Null)
            }
            "toggleTorch" => {
                let on = args
                    .get("on")
                    .and_then(Value::as_bool)
                    .ok_or(ScanError::MissingArgument { name: "on" })?;
                Ok(Value::Bool(self.session.toggle_torch(on).await))
            }
            "parse" => {
                let path = args
                    .get("path")
                    .and_then(Value::as_str)
                    .ok_or(ScanError::MissingArgument { name: "path" })?;
                Ok(match self.decode_static_image(path).await {
                    Some(text) => Value::String(text),
                    None => Value::Null,
                })
            }
            "dispose" | "shutdown" => {
                self.session.dispose().await;
                Ok(Value::Null)
            }
            other => {
                warn!(method = other, "unknown command");
                Err(ScanError::UnsupportedCommand(other.to_string()))
            }
        }
    }

    /// Forward a host lifecycle signal to the session.
    pub async fn handle_lifecycle(&self, event: LifecycleEvent) {
        self.session.handle_lifecycle(event).await;
    }

    /// Decode a code from an image file on disk.
    ///
    /// Runs the file I/O and pixel conversion on the blocking pool. Any
    /// failure to produce a scannable image, and any decode miss, collapses
    /// to `None`; a successful decode fires the haptic pulse like a live
    /// capture.
    pub async fn decode_static_image(&self, path: &str) -> Option<String> {
        let bound = self.config.downscale_bound;
        let file = PathBuf::from(path);
        let loaded = tokio::task::spawn_blocking(move || scan_engine::load_image(&file, bound))
            .await
            .ok()
            .flatten()?;

        match self.engine.decode_image(&loaded).await {
            DecodeOutcome::Text(text) => {
                self.haptics.pulse(CAPTURE_PULSE);
                Some(text)
            }
            DecodeOutcome::NotFound => None,
        }
    }
}
