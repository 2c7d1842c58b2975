// Media element boundary
//
// The session consumes intrinsic video properties (dimensions, duration)
// through this module and nothing else; actual playback stays with the
// external media surface. The probe abstraction keeps the state machine
// testable without a real media toolchain installed.

pub mod probe;

use async_trait::async_trait;
use std::path::Path;

pub use probe::FfprobeProbe;

use crate::config::MediaConfig;
use crate::error::Result;

/// Resolved intrinsic properties of a video file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl VideoProperties {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Main trait for resolving video metadata
#[async_trait]
pub trait MediaProbeTrait: Send + Sync {
    /// Resolve width, height and duration for a video file
    async fn probe(&self, path: &Path) -> Result<VideoProperties>;

    /// Check if the probe binary is available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media probe instances
pub struct MediaProbeFactory;

impl MediaProbeFactory {
    /// Create the default media probe implementation (ffprobe-based)
    pub fn create_probe(config: MediaConfig) -> Box<dyn MediaProbeTrait> {
        Box::new(probe::FfprobeProbe::new(config))
    }
}
