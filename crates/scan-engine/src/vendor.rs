//! Vendor-accelerated decode path.
//!
//! Some deployments ship a platform scan service as a shared library. It is
//! an optional runtime fact: the library may or may not be installed, so it
//! is located with a dynamic probe rather than a link-time dependency, and
//! its absence degrades silently to the fallback reader.
//!
//! ABI: `scankit_decode(data, width, height, channels)` returns a
//! NUL-terminated UTF-8 payload (caller frees via `scankit_string_free`) or
//! null when nothing was found. `channels` is 1 for tightly packed gray,
//! 3 for packed RGB.

use image::RgbImage;
use libloading::Library;
use scan_core::{DecodeOutcome, LuminanceSource};
use std::ffi::CStr;
use std::os::raw::c_char;
use tracing::{debug, info, warn};

type DecodeFn =
    unsafe extern "C" fn(data: *const u8, width: u32, height: u32, channels: u32) -> *mut c_char;
type FreeFn = unsafe extern "C" fn(ptr: *mut c_char);

/// Library names probed, in order, when `SCANKIT_LIBRARY` is not set.
const LIBRARY_CANDIDATES: &[&str] = &["libscankit.so", "libscankit.dylib", "scankit.dll"];

/// Handle to the vendor decode service.
///
/// Holds the loaded library for as long as the raw entry points are used.
pub(crate) struct VendorEngine {
    decode: DecodeFn,
    free: FreeFn,
    _lib: Library,
}

impl VendorEngine {
    /// Probe the environment for the vendor library.
    ///
    /// Nontrivial cost (dlopen plus symbol resolution); callers cache the
    /// result for the session lifetime instead of re-probing per frame.
    pub(crate) fn probe() -> Option<Self> {
        let override_path = std::env::var("SCANKIT_LIBRARY").ok();
        let candidates: Vec<&str> = match override_path.as_deref() {
            Some(path) => vec![path],
            None => LIBRARY_CANDIDATES.to_vec(),
        };

        for name in candidates {
            // SAFETY: loading an arbitrary library runs its initializers; the
            // candidate names are fixed or operator-supplied, not user input.
            let lib = match unsafe { Library::new(name) } {
                Ok(lib) => lib,
                Err(err) => {
                    debug!(library = name, %err, "vendor scan library not loadable");
                    continue;
                }
            };

            // SAFETY: symbol types must match the documented scankit ABI.
            let resolved = unsafe {
                let decode = lib.get::<DecodeFn>(b"scankit_decode\0").map(|s| *s);
                let free = lib.get::<FreeFn>(b"scankit_string_free\0").map(|s| *s);
                (decode, free)
            };
            match resolved {
                (Ok(decode), Ok(free)) => {
                    info!(library = name, "vendor scan service available");
                    return Some(Self {
                        decode,
                        free,
                        _lib: lib,
                    });
                }
                _ => {
                    warn!(
                        library = name,
                        "library found but scankit entry points missing"
                    );
                }
            }
        }
        None
    }

    /// Decode from a packed RGB image (the vendor engine's native input).
    pub(crate) fn decode_rgb(&self, rgb: &RgbImage) -> DecodeOutcome {
        self.call(rgb.as_raw(), rgb.width(), rgb.height(), 3)
    }

    /// Decode from a luminance plane, presented as single-channel gray.
    pub(crate) fn decode_gray(&self, luma: &LuminanceSource) -> DecodeOutcome {
        self.call(
            luma.cropped_plane().as_ref(),
            luma.crop_width(),
            luma.crop_height(),
            1,
        )
    }

    fn call(&self, data: &[u8], width: u32, height: u32, channels: u32) -> DecodeOutcome {
        if data.len() < (width as usize) * (height as usize) * (channels as usize) {
            return DecodeOutcome::NotFound;
        }
        // SAFETY: data covers width*height*channels bytes (checked above) and
        // outlives the call; the returned pointer is owned by the library and
        // released through its paired free function.
        let raw = unsafe { (self.decode)(data.as_ptr(), width, height, channels) };
        if raw.is_null() {
            return DecodeOutcome::NotFound;
        }
        // SAFETY: non-null return is a NUL-terminated string per the ABI.
        let text = unsafe { CStr::from_ptr(raw) }
            .to_str()
            .map(str::to_owned);
        // SAFETY: raw came from scankit_decode and is freed exactly once.
        unsafe { (self.free)(raw) };

        match text {
            Ok(text) if !text.is_empty() => DecodeOutcome::Text(text),
            Ok(_) => DecodeOutcome::NotFound,
            Err(err) => {
                // Treated as a contained engine fault, not surfaced.
                warn!(%err, "vendor decode returned invalid UTF-8");
                DecodeOutcome::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_without_library_is_none() {
        // No scankit library in the test environment; the probe must degrade
        // silently rather than error.
        assert!(VendorEngine::probe().is_none());
    }
}
