//! Mock camera driver for tests and simulation.
//!
//! Implements [`scan_core::CameraDevice`] without hardware: tests script
//! frame delivery with [`MockCamera::push_frame`] and observe bind/unbind
//! accounting, torch state, and outstanding-buffer counts to verify the
//! session layer's lifecycle and release-exactly-once contracts.

mod mock_camera;
pub mod pattern;

pub use mock_camera::{MockCamera, MockCameraConfig};
