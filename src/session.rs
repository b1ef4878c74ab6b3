//! Capture session: camera binding, analyzer, and the scan state machine.
//!
//! Two independent suspend axes feed the machine and must not be conflated:
//! the host lifecycle tears the hardware binding down completely (expensive,
//! requires `start_camera` to recover), while caller pause/resume only
//! detaches the analyzer (cheap, hardware stays bound). The scan-once
//! debounce flag is set synchronously on the analyzer task before any event
//! is dispatched, so a second near-simultaneous frame can never fire a
//! second capture.

use crate::config::ScanConfig;
use crate::haptics::{Haptics, CAPTURE_PULSE};
use parking_lot::Mutex;
use scan_core::{
    frame_channel, CameraDevice, DecodeOutcome, FrameSink, FrameSource, LifecycleEvent, ScanEvent,
    ScanState,
};
use scan_engine::DecodeEngine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Everything the analyzer task needs; kept separate from the session so
/// the task holds no reference cycle back to it.
struct AnalyzerCtx {
    engine: Arc<DecodeEngine>,
    sink: FrameSink,
    state: Arc<Mutex<ScanState>>,
    scanned_once: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<ScanEvent>,
    haptics: Arc<dyn Haptics>,
}

/// A camera bound to the decode pipeline.
///
/// Exclusively owns the frame channel and the camera binding. All decode
/// work runs on one dedicated analyzer task; state transitions observable
/// by the caller are delivered over the event channel.
pub struct CaptureSession {
    camera: Arc<dyn CameraDevice>,
    sink: FrameSink,
    state: Arc<Mutex<ScanState>>,
    /// Guards `start_camera` idempotence, including mid-transition calls.
    started: AtomicBool,
    scanned_once: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<ScanEvent>,
    analyzer: Mutex<Option<JoinHandle<()>>>,
    config: ScanConfig,
}

impl CaptureSession {
    /// Create a session and spawn its analyzer task.
    ///
    /// Returns the session plus the event stream the caller's context
    /// consumes. Must run inside a tokio runtime.
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        engine: Arc<DecodeEngine>,
        haptics: Arc<dyn Haptics>,
        config: ScanConfig,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<ScanEvent>) {
        let (sink, source) = frame_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(ScanState::Idle));
        let scanned_once = Arc::new(AtomicBool::new(false));

        let ctx = AnalyzerCtx {
            engine,
            sink: sink.clone(),
            state: state.clone(),
            scanned_once: scanned_once.clone(),
            events: events_tx.clone(),
            haptics,
        };
        let analyzer = tokio::spawn(analyzer_loop(source, ctx));

        let session = Arc::new(Self {
            camera,
            sink,
            state,
            started: AtomicBool::new(false),
            scanned_once,
            events: events_tx,
            analyzer: Mutex::new(Some(analyzer)),
            config,
        });
        (session, events_rx)
    }

    /// Current state of the machine.
    pub fn state(&self) -> ScanState {
        *self.state.lock()
    }

    /// Bind the camera and attach the analyzer.
    ///
    /// Idempotent: calling while already started (or mid-transition) is a
    /// logged no-op. A bind failure emits `CameraError` and leaves the
    /// session retryable.
    pub async fn start_camera(&self) {
        if self.state() == ScanState::Disposed {
            debug!("start_camera ignored: session disposed");
            return;
        }
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("start_camera called while already started, ignoring");
            return;
        }

        // Stale bindings from a previous run are released first; failures
        // here are not meaningful.
        self.camera.unbind().await;

        info!(
            width = self.config.analysis_width,
            height = self.config.analysis_height,
            "starting camera"
        );
        match self.camera.bind(self.sink.clone()).await {
            Ok(()) => {
                // A dispose racing the awaited bind wins: the terminal state
                // is re-checked under the lock and the fresh binding released.
                let armed = {
                    let mut state = self.state.lock();
                    if *state == ScanState::Disposed {
                        false
                    } else {
                        self.scanned_once.store(false, Ordering::SeqCst);
                        self.sink.set_active(true);
                        *state = ScanState::Armed;
                        true
                    }
                };
                if armed {
                    let _ = self.events.send(ScanEvent::CameraReady);
                } else {
                    debug!("session disposed during bind, releasing camera");
                    self.camera.unbind().await;
                }
            }
            Err(err) => {
                error!(%err, "camera bind failed");
                self.started.store(false, Ordering::SeqCst);
                let _ = self.events.send(ScanEvent::CameraError);
            }
        }
    }

    /// Detach the analyzer, keeping the hardware bound (cheap to resume).
    pub fn pause(&self) {
        let mut state = self.state.lock();
        match *state {
            ScanState::Armed | ScanState::Captured => {
                self.sink.set_active(false);
                *state = ScanState::Paused;
                debug!("scanning paused");
            }
            other => debug!(state = %other, "pause ignored"),
        }
    }

    /// Clear the scan-once debounce and reattach the analyzer.
    pub fn resume(&self) {
        let mut state = self.state.lock();
        match *state {
            ScanState::Captured | ScanState::Paused => {
                self.scanned_once.store(false, Ordering::SeqCst);
                self.sink.set_active(true);
                *state = ScanState::Armed;
                debug!("scanning resumed");
            }
            other => debug!(state = %other, "resume ignored"),
        }
    }

    /// Forward a torch toggle to the hardware control.
    ///
    /// Silently ignored (returns `false`) when no binding exists or the
    /// session is disposed; never an error.
    pub async fn toggle_torch(&self, on: bool) -> bool {
        if self.state() == ScanState::Disposed {
            return false;
        }
        self.camera.set_torch(on).await
    }

    /// Apply a host lifecycle signal.
    pub async fn handle_lifecycle(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Backgrounded => self.on_backgrounded().await,
            LifecycleEvent::Foregrounded => self.on_foregrounded().await,
        }
    }

    /// Full hardware teardown. Recovery requires `start_camera`.
    async fn on_backgrounded(&self) {
        {
            let state = self.state.lock();
            if !matches!(
                *state,
                ScanState::Armed | ScanState::Captured | ScanState::Paused
            ) {
                return;
            }
        }
        info!("lifecycle background: unbinding camera");
        self.sink.set_active(false);
        self.camera.unbind().await;
        self.started.store(false, Ordering::SeqCst);
        let mut state = self.state.lock();
        if *state != ScanState::Disposed {
            *state = ScanState::Idle;
        }
    }

    async fn on_foregrounded(&self) {
        if self.state() == ScanState::Idle {
            info!("lifecycle foreground: restarting camera");
            self.start_camera().await;
        }
    }

    /// Terminal release of all resources.
    ///
    /// The analyzer is drained rather than aborted: an in-flight decode is
    /// allowed to finish so the shared fallback reader is never left
    /// mid-reset. Subsequent commands are no-ops.
    pub async fn dispose(&self) {
        {
            let mut state = self.state.lock();
            if *state == ScanState::Disposed {
                return;
            }
            *state = ScanState::Disposed;
        }
        info!("disposing capture session");
        self.sink.set_active(false);
        self.sink.close();
        self.camera.unbind().await;
        self.started.store(false, Ordering::SeqCst);

        let handle = self.analyzer.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                error!(%err, "analyzer task ended abnormally");
            }
        }
    }

    /// Frames dropped so far by the keep-only-latest policy.
    pub fn dropped_frames(&self) -> u64 {
        self.sink.dropped_frames()
    }
}

/// Dedicated decode worker: single consumer of the frame slot.
///
/// Serializes all frame analysis; the camera feed and the caller context
/// never block on a decode. Ends when the frame channel closes.
async fn analyzer_loop(mut source: FrameSource, ctx: AnalyzerCtx) {
    while let Some(frame) = source.next().await {
        // Frame release is RAII: the buffer returns to the camera when
        // `frame` drops, on every exit path of this iteration.
        if ctx.scanned_once.load(Ordering::SeqCst) {
            continue;
        }
        // Each attempt runs on its own task: a panic inside an engine is
        // contained there (and still releases the frame via unwind) instead
        // of taking the whole stream down.
        let engine = ctx.engine.clone();
        let outcome = match tokio::spawn(async move {
            let outcome = engine.decode_frame(&frame).await;
            drop(frame);
            outcome
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%err, "decode attempt aborted");
                DecodeOutcome::NotFound
            }
        };

        let text = match outcome {
            DecodeOutcome::Text(text) => text,
            DecodeOutcome::NotFound => continue,
        };
        // Debounce set before any dispatch: frames arrive faster than the
        // caller-context hop that consumes the result.
        if ctx.scanned_once.swap(true, Ordering::SeqCst) {
            continue;
        }
        ctx.sink.set_active(false);
        {
            let mut state = ctx.state.lock();
            if *state == ScanState::Disposed {
                break;
            }
            *state = ScanState::Captured;
        }
        info!(len = text.len(), "code captured");
        let _ = ctx.events.send(ScanEvent::Captured(text));
        ctx.haptics.pulse(CAPTURE_PULSE);
    }
    debug!("analyzer task finished");
}
