//! Runtime configuration for the capture pipeline.

use scan_engine::Symbology;
use serde::Deserialize;

/// Tunables for a scanning session.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Preferred analyzer stream width in pixels (default: 1280).
    #[serde(default = "default_analysis_width")]
    pub analysis_width: u32,

    /// Preferred analyzer stream height in pixels (default: 720).
    #[serde(default = "default_analysis_height")]
    pub analysis_height: u32,

    /// Static images are downscaled until no larger than this bound
    /// per axis before decoding (default: 800).
    #[serde(default = "default_downscale_bound")]
    pub downscale_bound: u32,

    /// Symbologies the decode engines are hinted with.
    #[serde(default = "default_symbologies")]
    pub symbologies: Vec<Symbology>,
}

fn default_analysis_width() -> u32 {
    1280
}
fn default_analysis_height() -> u32 {
    720
}
fn default_downscale_bound() -> u32 {
    scan_engine::convert::DEFAULT_DOWNSCALE_BOUND
}
fn default_symbologies() -> Vec<Symbology> {
    Symbology::ALL.to_vec()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            analysis_width: default_analysis_width(),
            analysis_height: default_analysis_height(),
            downscale_bound: default_downscale_bound(),
            symbologies: default_symbologies(),
        }
    }
}
