//! Frame and luminance data types.
//!
//! A [`Frame`] wraps one camera buffer. Camera buffer pools are finite, so a
//! frame must be returned to its pool exactly once regardless of how the
//! decode attempt ends; that contract is expressed as an optional reclaim
//! hook invoked from `Drop`, which covers every exit path including unwinds.

use std::borrow::Cow;

/// Hook invoked exactly once when a [`Frame`] is released.
///
/// `Sync` as well as `Send`: frames are borrowed across await points on
/// spawned tasks, so shared references must be sendable too.
type ReclaimHook = Box<dyn FnOnce() + Send + Sync>;

/// A single camera buffer delivered to the analyzer.
///
/// Stores only the luminance (Y) plane; that is all the decoders consume
/// from live frames. `row_stride` may exceed `width` when the device pads
/// rows to an alignment boundary.
pub struct Frame {
    width: u32,
    height: u32,
    row_stride: u32,
    luma: Vec<u8>,
    reclaim: Option<ReclaimHook>,
}

impl Frame {
    /// Create a frame without a reclaim hook (buffer ownership is plain).
    pub fn new(width: u32, height: u32, row_stride: u32, luma: Vec<u8>) -> Self {
        Self {
            width,
            height,
            row_stride,
            luma,
            reclaim: None,
        }
    }

    /// Create a frame whose buffer must be handed back to the producer.
    ///
    /// `reclaim` runs exactly once when the frame is dropped.
    pub fn with_reclaim(
        width: u32,
        height: u32,
        row_stride: u32,
        luma: Vec<u8>,
        reclaim: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            width,
            height,
            row_stride,
            luma,
            reclaim: Some(Box::new(reclaim)),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row of the luminance plane (>= width).
    pub fn row_stride(&self) -> u32 {
        self.row_stride
    }

    /// Raw luminance plane, `row_stride * height` bytes.
    pub fn luma_plane(&self) -> &[u8] {
        &self.luma
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some(hook) = self.reclaim.take() {
            hook();
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("row_stride", &self.row_stride)
            .field("reclaim", &self.reclaim.is_some())
            .finish()
    }
}

/// Owned single-channel brightness view over a frame or a loaded file image.
///
/// Exclusively owned by the decode call that created it; never shared across
/// threads. The plane is tightly packed (stride == width).
#[derive(Debug, Clone)]
pub struct LuminanceSource {
    plane: Vec<u8>,
    width: u32,
    height: u32,
    crop_x: u32,
    crop_y: u32,
    crop_width: u32,
    crop_height: u32,
}

impl LuminanceSource {
    /// Full-extent source over a tightly packed plane.
    ///
    /// The plane is truncated or zero-padded to exactly `width * height`
    /// bytes, so downstream decoders can rely on the claimed extent even
    /// when a device delivers a short buffer.
    pub fn from_plane(mut plane: Vec<u8>, width: u32, height: u32) -> Self {
        plane.resize((width as usize) * (height as usize), 0);
        Self {
            plane,
            width,
            height,
            crop_x: 0,
            crop_y: 0,
            crop_width: width,
            crop_height: height,
        }
    }

    /// Restrict the source to a rectangular region.
    ///
    /// The region is clamped to the plane bounds.
    pub fn with_crop(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.crop_x = x.min(self.width);
        self.crop_y = y.min(self.height);
        self.crop_width = width.min(self.width - self.crop_x);
        self.crop_height = height.min(self.height - self.crop_y);
        self
    }

    /// Plane width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Crop region as (x, y, width, height).
    pub fn crop(&self) -> (u32, u32, u32, u32) {
        (self.crop_x, self.crop_y, self.crop_width, self.crop_height)
    }

    /// Crop width in pixels.
    pub fn crop_width(&self) -> u32 {
        self.crop_width
    }

    /// Crop height in pixels.
    pub fn crop_height(&self) -> u32 {
        self.crop_height
    }

    /// Bytes of the cropped region, row-major and tightly packed.
    ///
    /// Borrows when the crop covers the full plane; copies otherwise.
    pub fn cropped_plane(&self) -> Cow<'_, [u8]> {
        if self.crop_x == 0
            && self.crop_y == 0
            && self.crop_width == self.width
            && self.crop_height == self.height
        {
            return Cow::Borrowed(&self.plane);
        }
        let mut out = Vec::with_capacity((self.crop_width as usize) * (self.crop_height as usize));
        for row in self.crop_y..self.crop_y + self.crop_height {
            let start = (row as usize) * (self.width as usize) + self.crop_x as usize;
            out.extend_from_slice(&self.plane[start..start + self.crop_width as usize]);
        }
        Cow::Owned(out)
    }
}

/// Result of one decode attempt: decoded text or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A supported code was located and decoded.
    Text(String),
    /// No code was found (covers contained engine faults as well).
    NotFound,
}

impl DecodeOutcome {
    /// True when a payload was decoded.
    pub fn is_found(&self) -> bool {
        matches!(self, DecodeOutcome::Text(_))
    }

    /// Extract the decoded payload, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            DecodeOutcome::Text(text) => Some(text),
            DecodeOutcome::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn reclaim_hook_runs_exactly_once_on_drop() {
        let count = Arc::new(AtomicU32::new(0));
        let hook_count = count.clone();
        let frame = Frame::with_reclaim(4, 4, 4, vec![0u8; 16], move || {
            hook_count.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);
        drop(frame);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn frames_are_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Frame>();
        assert_send_sync::<LuminanceSource>();
    }

    #[test]
    fn short_plane_is_padded_to_claimed_extent() {
        let src = LuminanceSource::from_plane(vec![1u8; 3], 4, 4);
        let plane = src.cropped_plane();
        assert_eq!(plane.len(), 16);
        assert_eq!(&plane[..3], &[1, 1, 1]);
        assert_eq!(plane[3], 0);
    }

    #[test]
    fn luminance_source_full_crop_borrows() {
        let src = LuminanceSource::from_plane(vec![7u8; 12], 4, 3);
        assert_eq!(src.crop(), (0, 0, 4, 3));
        assert!(matches!(src.cropped_plane(), Cow::Borrowed(_)));
    }

    #[test]
    fn luminance_source_crop_extracts_region() {
        // 4x4 plane with row-major values 0..16
        let plane: Vec<u8> = (0..16).collect();
        let src = LuminanceSource::from_plane(plane, 4, 4).with_crop(1, 1, 2, 2);
        assert_eq!(src.cropped_plane().as_ref(), &[5, 6, 9, 10]);
    }

    #[test]
    fn luminance_source_crop_is_clamped() {
        let src = LuminanceSource::from_plane(vec![0u8; 16], 4, 4).with_crop(3, 3, 10, 10);
        assert_eq!(src.crop(), (3, 3, 1, 1));
    }

    #[test]
    fn outcome_accessors() {
        assert!(DecodeOutcome::Text("x".into()).is_found());
        assert!(!DecodeOutcome::NotFound.is_found());
        assert_eq!(DecodeOutcome::NotFound.into_text(), None);
        assert_eq!(
            DecodeOutcome::Text("abc".into()).into_text().as_deref(),
            Some("abc")
        );
    }
}
