use serde::{Deserialize, Serialize};

use crate::error::{MontajError, Result};

/// A single timed subtitle line on the video's native timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// A span the analysis judged to contain no meaningful speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

/// Source orientation as classified by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    Vertical,
    Horizontal,
}

impl VideoFormat {
    pub fn label(&self) -> &'static str {
        match self {
            VideoFormat::Vertical => "9:16 vertical",
            VideoFormat::Horizontal => "16:9 horizontal",
        }
    }
}

/// Structured judgment returned by the analysis service for one video.
///
/// Created atomically from one successful analysis exchange and immutable
/// afterwards. The wire format uses camelCase field names; a response missing
/// any field without a serde default is rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub detected_languages: Vec<String>,
    pub original_format: VideoFormat,
    pub rewritten_script: String,
    #[serde(default)]
    pub pacing_summary: String,
    pub subtitles: Vec<SubtitleEntry>,
    pub silence_cuts: Vec<TimeRange>,
}

impl AnalysisResult {
    /// Check the timing invariants the playback side relies on: start <= end
    /// for every subtitle and silence cut, and subtitle starts non-decreasing.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.subtitles {
            if entry.start > entry.end {
                return Err(MontajError::MalformedResponse(format!(
                    "subtitle range is inverted: {} > {}",
                    entry.start, entry.end
                )));
            }
        }

        for window in self.subtitles.windows(2) {
            if window[0].start > window[1].start {
                return Err(MontajError::MalformedResponse(format!(
                    "subtitles are not ordered by start time: {} after {}",
                    window[1].start, window[0].start
                )));
            }
        }

        for cut in &self.silence_cuts {
            if cut.start > cut.end {
                return Err(MontajError::MalformedResponse(format!(
                    "silence cut range is inverted: {} > {}",
                    cut.start, cut.end
                )));
            }
        }

        Ok(())
    }

    /// Number of dead-air segments flagged for removal.
    pub fn silence_segment_count(&self) -> usize {
        self.silence_cuts.len()
    }

    pub fn is_vertical(&self) -> bool {
        self.original_format == VideoFormat::Vertical
    }
}
