//! Engine-selection policy.
//!
//! Try the vendor engine when the environment provides one; on any miss or
//! contained fault, fall through to the open multi-format reader. The call
//! returns `NotFound` only when both attempted engines find nothing.

use crate::convert::{self, LoadedImage};
use crate::fallback::FallbackReader;
use crate::vendor::VendorEngine;
use once_cell::sync::OnceCell;
use scan_core::{DecodeOutcome, Frame, LuminanceSource};
use tokio::sync::Mutex;
use tracing::debug;

/// Symbologies the pipeline is configured to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    /// QR Code (2D).
    QrCode,
    /// Code 128 (1D).
    Code128,
    /// EAN-13 (1D retail).
    Ean13,
    /// Data Matrix (2D).
    DataMatrix,
}

impl Symbology {
    /// The full supported hint set.
    pub const ALL: [Symbology; 4] = [
        Symbology::QrCode,
        Symbology::Code128,
        Symbology::Ean13,
        Symbology::DataMatrix,
    ];
}

/// Shared decode engine: vendor fast path plus serialized fallback reader.
///
/// One instance serves both the live-camera analyzer and static-file decode
/// calls. At most one fallback decode is in flight at a time: every attempt
/// runs under the internal mutex. The vendor engine is stateless per call
/// and needs no serialization.
pub struct DecodeEngine {
    fallback: Mutex<FallbackReader>,
    /// Probe result, evaluated lazily on first decode and cached for the
    /// engine's lifetime. Re-probing per call costs a dlopen walk.
    vendor: OnceCell<Option<VendorEngine>>,
}

impl DecodeEngine {
    /// Engine restricted to the given symbologies.
    pub fn new(symbologies: &[Symbology]) -> Self {
        Self {
            fallback: Mutex::new(FallbackReader::new(symbologies)),
            vendor: OnceCell::new(),
        }
    }

    /// Engine with the full supported hint set.
    pub fn with_default_symbologies() -> Self {
        Self::new(&Symbology::ALL)
    }

    fn vendor(&self) -> Option<&VendorEngine> {
        self.vendor.get_or_init(VendorEngine::probe).as_ref()
    }

    /// True when the vendor decode service was found in this environment.
    pub fn vendor_available(&self) -> bool {
        self.vendor().is_some()
    }

    /// Decode a live camera frame.
    pub async fn decode_frame(&self, frame: &Frame) -> DecodeOutcome {
        let luma = convert::luminance_from_frame(frame);
        if let Some(vendor) = self.vendor() {
            if let DecodeOutcome::Text(text) = vendor.decode_gray(&luma) {
                debug!("vendor engine decoded live frame");
                return DecodeOutcome::Text(text);
            }
        }
        self.decode_luminance(&luma).await
    }

    /// Decode a loaded file image (vendor path sees the color image).
    pub async fn decode_image(&self, image: &LoadedImage) -> DecodeOutcome {
        if let Some(vendor) = self.vendor() {
            if let DecodeOutcome::Text(text) = vendor.decode_rgb(&image.rgb) {
                debug!("vendor engine decoded static image");
                return DecodeOutcome::Text(text);
            }
        }
        self.decode_luminance(&image.luma).await
    }

    /// Decode a luminance plane through the serialized fallback reader.
    pub async fn decode_luminance(&self, luma: &LuminanceSource) -> DecodeOutcome {
        let mut reader = self.fallback.lock().await;
        reader.decode(luma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxing::{BarcodeFormat, MultiFormatWriter, Writer};

    fn qr_frame(payload: &str, size: u32) -> Frame {
        let matrix = MultiFormatWriter
            .encode(payload, &BarcodeFormat::QR_CODE, size as i32, size as i32)
            .unwrap();
        let width = matrix.getWidth();
        let height = matrix.getHeight();
        let mut plane = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                plane.push(if matrix.get(x, y) { 0u8 } else { 255u8 });
            }
        }
        Frame::new(width, height, width, plane)
    }

    #[test]
    fn engine_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DecodeEngine>();
    }

    #[tokio::test]
    async fn frame_decode_falls_back_without_vendor_service() {
        let engine = DecodeEngine::with_default_symbologies();
        assert!(!engine.vendor_available());

        let frame = qr_frame("fallback-path", 240);
        assert_eq!(
            engine.decode_frame(&frame).await,
            DecodeOutcome::Text("fallback-path".into())
        );
    }

    #[tokio::test]
    async fn round_trip_over_payload_lengths() {
        let engine = DecodeEngine::with_default_symbologies();
        for payload in [
            "a",
            "wifi:T:WPA;S:lab;P:hunter2;;",
            &"x".repeat(120),
        ] {
            let frame = qr_frame(payload, 320);
            assert_eq!(
                engine.decode_frame(&frame).await,
                DecodeOutcome::Text(payload.to_string()),
                "payload of length {} must round-trip",
                payload.len()
            );
        }
    }

    #[tokio::test]
    async fn non_code_frame_is_not_found() {
        let engine = DecodeEngine::with_default_symbologies();
        let frame = Frame::new(240, 240, 240, vec![128u8; 240 * 240]);
        assert_eq!(engine.decode_frame(&frame).await, DecodeOutcome::NotFound);
    }

    #[tokio::test]
    async fn concurrent_decodes_do_not_cross_talk() {
        use std::sync::Arc;

        let engine = Arc::new(DecodeEngine::with_default_symbologies());
        let mut tasks = Vec::new();
        for i in 0..5 {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                let payload = format!("ticket-{i}");
                let frame = qr_frame(&payload, 240);
                (payload, engine.decode_frame(&frame).await)
            }));
        }
        for task in tasks {
            let (payload, outcome) = task.await.unwrap();
            assert_eq!(outcome, DecodeOutcome::Text(payload));
        }
    }
}
