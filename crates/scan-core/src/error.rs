//! Error taxonomy for the capture pipeline.
//!
//! Propagation policy: engine-internal faults are contained where they occur
//! and downgraded to "not found"; only structural misuse (missing argument,
//! unknown command, disposed session) and camera bind failures surface to the
//! caller. Nothing in this crate may panic the host process.

use thiserror::Error;

/// Convenience alias for results using the pipeline error type.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Primary error type for the capture pipeline.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Camera hardware or provider could not be bound.
    ///
    /// Reported to the caller as a `CameraError` event; non-fatal, the caller
    /// may retry `startCamera`.
    #[error("failed to bind camera: {0}")]
    CameraBind(String),

    /// An engine raised an internal error while attempting a decode.
    ///
    /// Always treated as "not found" for that engine and logged only; this
    /// variant never crosses the command surface.
    #[error("decode engine fault: {0}")]
    DecodeFault(String),

    /// A static image file was missing or could not be decoded as an image.
    ///
    /// Callers translate this to a null decode result, never an exception.
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    /// A command was invoked without a required parameter.
    #[error("missing required argument '{name}'")]
    MissingArgument {
        /// Name of the absent parameter.
        name: &'static str,
    },

    /// Unrecognized command name on the dispatch surface.
    #[error("unsupported command '{0}'")]
    UnsupportedCommand(String),

    /// The session has been disposed; no further commands are accepted.
    #[error("session is disposed")]
    Disposed,
}

impl ScanError {
    /// Stable machine-readable code for the command surface.
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::CameraBind(_) => "CAMERA_ERROR",
            ScanError::DecodeFault(_) => "DECODE_FAULT",
            ScanError::ImageLoad(_) => "IMAGE_LOAD_FAILED",
            ScanError::MissingArgument { .. } => "INVALID_ARGS",
            ScanError::UnsupportedCommand(_) => "NOT_IMPLEMENTED",
            ScanError::Disposed => "DISPOSED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = ScanError::CameraBind("provider unavailable".into());
        assert_eq!(err.to_string(), "failed to bind camera: provider unavailable");
    }

    #[test]
    fn missing_argument_maps_to_invalid_args() {
        let err = ScanError::MissingArgument { name: "path" };
        assert_eq!(err.code(), "INVALID_ARGS");
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn unsupported_command_maps_to_not_implemented() {
        assert_eq!(
            ScanError::UnsupportedCommand("fooBar".into()).code(),
            "NOT_IMPLEMENTED"
        );
    }
}
