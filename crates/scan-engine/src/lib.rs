//! `scan-engine`
//!
//! Pixel-format conversion and the dual-engine decode strategy.
//!
//! - [`convert`]: device-native buffers and file images into the luminance
//!   plane the decoders consume, with bounded downscaling for files
//! - [`DecodeEngine`]: engine-selection policy — a vendor-accelerated decoder
//!   probed dynamically at first use, falling back to the open multi-format
//!   reader ([`rxing`]) for anything the vendor path misses
//!
//! Fallback decodes are serialized behind one async mutex shared by the
//! live-camera path and all static-file calls, so at most one multi-format
//! search runs at a time.

pub mod convert;
mod engine;
mod fallback;
mod vendor;

pub use convert::{load_image, LoadedImage};
pub use engine::{DecodeEngine, Symbology};
