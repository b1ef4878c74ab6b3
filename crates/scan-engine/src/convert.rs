//! Pixel-format conversion into the decoder's luminance plane.
//!
//! Live frames already carry a luminance plane; extraction only compacts
//! padded rows. File images are bounds-probed first, decoded at a bounded
//! resolution, then converted with BT.601 broadcast luma/chroma coefficients.

use image::imageops::FilterType;
use image::RgbImage;
use scan_core::{Frame, LuminanceSource};
use std::path::Path;
use tracing::debug;

/// Largest dimension the decoders accept without downscaling, in pixels.
///
/// Matches the input size budget of both engines; decoding multi-megapixel
/// buffers wastes memory without improving detection.
pub const DEFAULT_DOWNSCALE_BOUND: u32 = 800;

/// A file image decoded for scanning.
///
/// Keeps the full-color image alongside the luminance plane: the vendor
/// engine operates on color images, the fallback reader on luminance.
pub struct LoadedImage {
    /// Downscaled RGB image for the vendor decode path.
    pub rgb: RgbImage,
    /// BT.601 luminance plane for the fallback decode path.
    pub luma: LuminanceSource,
}

/// Integer power-of-two downscale factor for a `width`x`height` image.
///
/// The factor is the largest power of two such that the halved dimensions
/// divided by it still meet `bound` in both axes; images within the bound
/// keep factor 1.
pub fn downscale_factor(width: u32, height: u32, bound: u32) -> u32 {
    let mut factor = 1;
    if width > bound || height > bound {
        let half_w = width / 2;
        let half_h = height / 2;
        while half_w / factor >= bound && half_h / factor >= bound {
            factor *= 2;
        }
    }
    factor
}

fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Convert one RGB pixel to BT.601 (Y, U, V), each clamped to [0, 255].
pub fn yuv_from_rgb(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (clamp_channel(y), clamp_channel(u), clamp_channel(v))
}

/// Extract the luminance plane of a live frame.
///
/// Pass-through: no recomputation, only compaction of rows padded to the
/// device's stride alignment.
pub fn luminance_from_frame(frame: &Frame) -> LuminanceSource {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = frame.row_stride() as usize;
    let plane = frame.luma_plane();

    if stride == width && plane.len() == width * height {
        return LuminanceSource::from_plane(plane.to_vec(), frame.width(), frame.height());
    }

    // Compacts padded rows, and tolerates planes shorter than the claimed
    // dimensions: missing bytes become black rather than a panic that would
    // kill the analyzer.
    let mut packed = Vec::with_capacity(width * height);
    for row in 0..height {
        let start = (row * stride).min(plane.len());
        let end = (start + width).min(plane.len());
        packed.extend_from_slice(&plane[start..end]);
    }
    packed.resize(width * height, 0);
    LuminanceSource::from_plane(packed, frame.width(), frame.height())
}

/// Convert a decoded color image to a luminance plane.
pub fn luminance_from_rgb(rgb: &RgbImage) -> LuminanceSource {
    let mut plane = Vec::with_capacity((rgb.width() as usize) * (rgb.height() as usize));
    for pixel in rgb.pixels() {
        let (y, _, _) = yuv_from_rgb(pixel.0[0], pixel.0[1], pixel.0[2]);
        plane.push(y);
    }
    LuminanceSource::from_plane(plane, rgb.width(), rgb.height())
}

/// Load a static image for scanning, downscaled to the decoder's budget.
///
/// Bounds are probed before the full decode so multi-megapixel files never
/// allocate at native resolution. Returns `None` for missing or corrupt
/// files; callers treat that as "not found", never as a fault.
pub fn load_image(path: &Path, bound: u32) -> Option<LoadedImage> {
    let (width, height) = match image::image_dimensions(path) {
        Ok(dims) => dims,
        Err(err) => {
            debug!(path = %path.display(), %err, "image bounds probe failed");
            return None;
        }
    };

    let decoded = match image::open(path) {
        Ok(img) => img,
        Err(err) => {
            debug!(path = %path.display(), %err, "image decode failed");
            return None;
        }
    };

    let factor = downscale_factor(width, height, bound);
    let rgb = if factor > 1 {
        decoded
            .resize_exact(width / factor, height / factor, FilterType::Triangle)
            .to_rgb8()
    } else {
        decoded.to_rgb8()
    };
    debug!(
        path = %path.display(),
        width,
        height,
        factor,
        "loaded image for scanning"
    );

    let luma = luminance_from_rgb(&rgb);
    Some(LoadedImage { rgb, luma })
}
