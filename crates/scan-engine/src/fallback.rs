//! Open multi-format fallback reader.
//!
//! Wraps `rxing`'s `MultiFormatReader` (binarization then symbol search).
//! The reader and its hint dictionary hold non-`Send` callback state, so
//! neither is stored: only the configured format set persists, and a fresh
//! reader is built for each attempt inside the serialized section that
//! [`crate::DecodeEngine`] owns. That also guarantees no decode state can
//! survive from one frame into the next.

use crate::engine::Symbology;
use rxing::common::HybridBinarizer;
use rxing::{
    BarcodeFormat, BinaryBitmap, DecodeHintType, DecodeHintValue, DecodingHintDictionary,
    Luma8LuminanceSource, MultiFormatReader,
};
use scan_core::{DecodeOutcome, LuminanceSource};
use std::collections::{HashMap, HashSet};
use tracing::trace;

fn barcode_format(symbology: Symbology) -> BarcodeFormat {
    match symbology {
        Symbology::QrCode => BarcodeFormat::QR_CODE,
        Symbology::Code128 => BarcodeFormat::CODE_128,
        Symbology::Ean13 => BarcodeFormat::EAN_13,
        Symbology::DataMatrix => BarcodeFormat::DATA_MATRIX,
    }
}

pub(crate) struct FallbackReader {
    formats: HashSet<BarcodeFormat>,
}

impl FallbackReader {
    pub(crate) fn new(symbologies: &[Symbology]) -> Self {
        Self {
            formats: symbologies.iter().copied().map(barcode_format).collect(),
        }
    }

    fn hints(&self) -> DecodingHintDictionary {
        let mut hints: DecodingHintDictionary = HashMap::new();
        hints.insert(
            DecodeHintType::POSSIBLE_FORMATS,
            DecodeHintValue::PossibleFormats(self.formats.clone()),
        );
        hints.insert(DecodeHintType::TRY_HARDER, DecodeHintValue::TryHarder(true));
        hints
    }

    /// Attempt one decode with a reader scoped to this call.
    ///
    /// Any internal reader fault is contained here and reported as
    /// `NotFound`; a malformed frame must never take down the stream.
    pub(crate) fn decode(&mut self, luma: &LuminanceSource) -> DecodeOutcome {
        let plane = luma.cropped_plane().into_owned();
        let source = Luma8LuminanceSource::new(plane, luma.crop_width(), luma.crop_height());
        let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));

        let mut reader = MultiFormatReader::default();
        reader.set_hints(&self.hints());
        match reader.decode_with_state(&mut bitmap) {
            Ok(result) => DecodeOutcome::Text(result.getText().to_owned()),
            Err(err) => {
                trace!(%err, "fallback reader found nothing");
                DecodeOutcome::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxing::{MultiFormatWriter, Writer};
    use scan_core::LuminanceSource;

    /// Render a payload as a QR symbol into a luminance plane.
    fn qr_luma(payload: &str, size: u32) -> LuminanceSource {
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
        LuminanceSource::from_plane(plane, width, height)
    }

    #[test]
    fn reader_state_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FallbackReader>();
    }

    #[test]
    fn decodes_generated_qr() {
        let mut reader = FallbackReader::new(&Symbology::ALL);
        let luma = qr_luma("https://example.com/item/42", 240);
        assert_eq!(
            reader.decode(&luma),
            DecodeOutcome::Text("https://example.com/item/42".into())
        );
    }

    #[test]
    fn blank_plane_is_not_found_without_raising() {
        let mut reader = FallbackReader::new(&Symbology::ALL);
        let luma = LuminanceSource::from_plane(vec![255u8; 240 * 240], 240, 240);
        assert_eq!(reader.decode(&luma), DecodeOutcome::NotFound);
    }

    #[test]
    fn noise_plane_is_not_found() {
        let mut reader = FallbackReader::new(&Symbology::ALL);
        // Deterministic speckle, no structure a symbol search could latch onto.
        let plane: Vec<u8> = (0..240u64 * 240)
            .map(|i| ((i.wrapping_mul(2654435761)) >> 24) as u8)
            .collect();
        let luma = LuminanceSource::from_plane(plane, 240, 240);
        assert_eq!(reader.decode(&luma), DecodeOutcome::NotFound);
    }

    #[test]
    fn state_does_not_leak_between_calls() {
        let mut reader = FallbackReader::new(&Symbology::ALL);
        let first = qr_luma("payload-one", 240);
        let blank = LuminanceSource::from_plane(vec![255u8; 240 * 240], 240, 240);
        let second = qr_luma("payload-two", 240);

        assert_eq!(
            reader.decode(&first),
            DecodeOutcome::Text("payload-one".into())
        );
        assert_eq!(reader.decode(&blank), DecodeOutcome::NotFound);
        assert_eq!(
            reader.decode(&second),
            DecodeOutcome::Text("payload-two".into())
        );
    }
}
