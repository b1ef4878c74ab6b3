//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use rxing::{BarcodeFormat, MultiFormatWriter, Writer};
use std::path::Path;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route tracing output through the test harness, once per binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Render a QR symbol into a luminance plane (dark modules are 0).
pub fn qr_plane(payload: &str, size: u32) -> (Vec<u8>, u32, u32) {
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
    (plane, width, height)
}

/// Write a QR symbol to a PNG file on disk.
pub fn write_qr_png(path: &Path, payload: &str, size: u32) {
    let (plane, width, height) = qr_plane(payload, size);
    let mut img = RgbImage::new(width, height);
    for (i, level) in plane.iter().enumerate() {
        let x = (i as u32) % width;
        let y = (i as u32) / width;
        img.put_pixel(x, y, Rgb([*level, *level, *level]));
    }
    img.save(path).unwrap();
}
