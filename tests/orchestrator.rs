//! Command dispatch and static-image decode through the orchestrator.

mod common;

use common::write_qr_png;
use parking_lot::Mutex;
use scan_driver_mock::MockCamera;
use scansnap::{
    Haptics, LifecycleEvent, NoopHaptics, ScanConfig, ScanEvent, SessionOrchestrator,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

struct RecordingHaptics {
    pulses: Mutex<Vec<Duration>>,
}

impl RecordingHaptics {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            pulses: Mutex::new(Vec::new()),
        })
    }

    fn pulse_count(&self) -> usize {
        self.pulses.lock().len()
    }
}

impl Haptics for RecordingHaptics {
    fn pulse(&self, duration: Duration) {
        self.pulses.lock().push(duration);
    }
}

fn orchestrator_with_mock() -> (
    MockCamera,
    SessionOrchestrator,
    UnboundedReceiver<ScanEvent>,
) {
    common::init_tracing();
    let camera = MockCamera::new();
    let (orchestrator, events) = SessionOrchestrator::build(
        Arc::new(camera.clone()),
        Arc::new(NoopHaptics),
        ScanConfig::default(),
    );
    (camera, orchestrator, events)
}

#[tokio::test]
async fn unknown_method_is_not_implemented() {
    let (_camera, orchestrator, _events) = orchestrator_with_mock();
    let err = orchestrator
        .dispatch("takeSnapshot", &Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_IMPLEMENTED");
}

#[tokio::test]
async fn toggle_torch_requires_its_flag() {
    let (camera, orchestrator, _events) = orchestrator_with_mock();

    let err = orchestrator
        .dispatch("toggleTorch", &Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ARGS");
    assert_eq!(camera.torch_calls(), 0);

    // Unbound camera: the toggle is swallowed, not an error.
    let result = orchestrator
        .dispatch("toggleTorch", &json!({ "on": true }))
        .await
        .unwrap();
    assert_eq!(result, Value::Bool(false));

    orchestrator.dispatch("startCamera", &Value::Null).await.unwrap();
    let result = orchestrator
        .dispatch("toggleTorch", &json!({ "on": true }))
        .await
        .unwrap();
    assert_eq!(result, Value::Bool(true));
    assert!(camera.torch_on());
}

#[tokio::test]
async fn parse_requires_a_path() {
    let (_camera, orchestrator, _events) = orchestrator_with_mock();
    let err = orchestrator
        .dispatch("parse", &json!({ "path": 42 }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ARGS");
}

#[tokio::test]
async fn parse_missing_file_is_null_not_error() {
    let (_camera, orchestrator, _events) = orchestrator_with_mock();
    let result = orchestrator
        .dispatch("parse", &json!({ "path": "/nonexistent/ticket.png" }))
        .await
        .unwrap();
    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn parse_decodes_a_file_and_pulses_haptics() {
    common::init_tracing();
    let camera = MockCamera::new();
    let haptics = RecordingHaptics::new();
    let (orchestrator, _events) = SessionOrchestrator::build(
        Arc::new(camera),
        haptics.clone(),
        ScanConfig::default(),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boarding-pass.png");
    write_qr_png(&path, "PNR/KX93LQ", 320);

    let result = orchestrator
        .dispatch("parse", &json!({ "path": path.to_string_lossy() }))
        .await
        .unwrap();
    assert_eq!(result, Value::String("PNR/KX93LQ".into()));
    assert_eq!(haptics.pulse_count(), 1);
}

#[tokio::test]
async fn parse_miss_on_blank_image_is_null() {
    common::init_tracing();
    let camera = MockCamera::new();
    let haptics = RecordingHaptics::new();
    let (orchestrator, _events) = SessionOrchestrator::build(
        Arc::new(camera),
        haptics.clone(),
        ScanConfig::default(),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.png");
    let img = image::RgbImage::from_pixel(200, 200, image::Rgb([255, 255, 255]));
    img.save(&path).unwrap();

    let result = orchestrator
        .dispatch("parse", &json!({ "path": path.to_string_lossy() }))
        .await
        .unwrap();
    assert_eq!(result, Value::Null);
    assert_eq!(haptics.pulse_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_parses_return_their_own_payloads() {
    let (_camera, orchestrator, _events) = orchestrator_with_mock();
    let orchestrator = Arc::new(orchestrator);
    let dir = tempfile::tempdir().unwrap();

    let mut tasks = Vec::new();
    for i in 0..5 {
        let payload = format!("crate-{i:03}");
        let path = dir.path().join(format!("label-{i}.png"));
        write_qr_png(&path, &payload, 280);

        let orchestrator = orchestrator.clone();
        tasks.push(tokio::spawn(async move {
            let result = orchestrator
                .dispatch("parse", &json!({ "path": path.to_string_lossy() }))
                .await
                .unwrap();
            (payload, result)
        }));
    }
    for task in tasks {
        let (payload, result) = task.await.unwrap();
        assert_eq!(result, Value::String(payload));
    }
}

#[tokio::test]
async fn parse_works_while_camera_is_live() {
    let (_camera, orchestrator, mut events) = orchestrator_with_mock();

    orchestrator.dispatch("startCamera", &Value::Null).await.unwrap();
    assert_eq!(events.recv().await, Some(ScanEvent::CameraReady));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.png");
    write_qr_png(&path, "SKU-55012", 320);

    let result = orchestrator
        .dispatch("parse", &json!({ "path": path.to_string_lossy() }))
        .await
        .unwrap();
    assert_eq!(result, Value::String("SKU-55012".into()));
}

#[tokio::test]
async fn dispatch_drives_the_session_lifecycle() {
    let (camera, orchestrator, mut events) = orchestrator_with_mock();

    orchestrator.dispatch("startCamera", &Value::Null).await.unwrap();
    assert_eq!(events.recv().await, Some(ScanEvent::CameraReady));

    orchestrator.dispatch("pause", &Value::Null).await.unwrap();
    orchestrator.dispatch("resume", &Value::Null).await.unwrap();
    assert_eq!(camera.bind_count(), 1);

    orchestrator.handle_lifecycle(LifecycleEvent::Backgrounded).await;
    assert!(!camera.is_bound());
    orchestrator.handle_lifecycle(LifecycleEvent::Foregrounded).await;
    assert_eq!(events.recv().await, Some(ScanEvent::CameraReady));
    assert_eq!(camera.bind_count(), 2);

    orchestrator.dispatch("dispose", &Value::Null).await.unwrap();
    let err = orchestrator
        .dispatch("startCamera", &Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DISPOSED");
    assert_eq!(camera.bind_count(), 2);

    // Disposal itself stays idempotent, and static decode stays available.
    orchestrator.dispatch("dispose", &Value::Null).await.unwrap();
    let result = orchestrator
        .dispatch("parse", &json!({ "path": "/nonexistent.png" }))
        .await
        .unwrap();
    assert_eq!(result, Value::Null);
}
