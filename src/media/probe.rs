use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::{MediaProbeTrait, VideoProperties};
use crate::config::MediaConfig;
use crate::error::{MontajError, Result};

/// Concrete implementation of the media probe (ffprobe-based)
pub struct FfprobeProbe {
    config: MediaConfig,
}

impl FfprobeProbe {
    /// Create a new probe implementation
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MediaProbeTrait for FfprobeProbe {
    /// Resolve width, height and duration for a video file
    async fn probe(&self, path: &Path) -> Result<VideoProperties> {
        debug!("Probing video metadata: {}", path.display());

        let output = tokio::process::Command::new(&self.config.binary_path)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("stream=width,height")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("json")
            .arg(path)
            .output()
            .await
            .map_err(|e| MontajError::Probe(format!("Failed to execute probe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MontajError::InvalidVideo(format!(
                "metadata never resolved: {}",
                stderr.trim()
            )));
        }

        let properties = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;
        info!(
            "Resolved video metadata: {}x{}, {:.2}s",
            properties.width, properties.height, properties.duration
        );

        Ok(properties)
    }

    /// Check if the probe binary is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| MontajError::Probe(format!("Media probe not found: {}", e)))?;

        if output.status.success() {
            info!("Media probe is available");
            Ok(())
        } else {
            Err(MontajError::Probe(
                "Media probe version check failed".to_string(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Parse ffprobe JSON output into video properties. A file without a video
/// stream or with zero dimensions is not a playable video.
fn parse_probe_output(json: &str) -> Result<VideoProperties> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| MontajError::Probe(format!("Failed to parse probe output: {}", e)))?;

    let stream = output
        .streams
        .first()
        .ok_or_else(|| MontajError::InvalidVideo("no video stream found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(MontajError::InvalidVideo(
                "video dimensions are missing".to_string(),
            ));
        }
    };

    let duration = output
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoProperties {
        width,
        height,
        duration,
    })
}
