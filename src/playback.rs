use tracing::debug;

use crate::metadata::SubtitleEntry;

/// Commands the synchronizer issues to the external playback surface. The
/// surface stays the sole owner of the actual playback position.
pub trait PlaybackControl {
    fn seek(&mut self, position_seconds: f64);
    fn play(&mut self);
    fn pause(&mut self);
}

/// Return the subtitle whose range contains `time_seconds`, or none for a
/// gap. Entries are expected sorted by start and non-overlapping; if the
/// input violates that, first match in list order wins.
pub fn active_entry_at(time_seconds: f64, subtitles: &[SubtitleEntry]) -> Option<&SubtitleEntry> {
    subtitles
        .iter()
        .find(|entry| time_seconds >= entry.start && time_seconds <= entry.end)
}

/// Jump playback to the start of a subtitle entry.
pub fn seek_to(entry: &SubtitleEntry, control: &mut dyn PlaybackControl) {
    debug!("Seeking playback to {:.2}s", entry.start);
    control.seek(entry.start);
}

/// Recomputation driver fed by the playback surface's time-update signal.
/// Holds nothing but the last observed time; the active entry is recomputed
/// per signal rather than on a polling interval, so overlay switching stays
/// aligned with playback.
#[derive(Debug, Default)]
pub struct PlaybackCursor {
    current_time: f64,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Record a time-update signal and return the entry active at that
    /// instant.
    pub fn on_time_update<'a>(
        &mut self,
        time_seconds: f64,
        subtitles: &'a [SubtitleEntry],
    ) -> Option<&'a SubtitleEntry> {
        self.current_time = time_seconds;
        active_entry_at(time_seconds, subtitles)
    }
}

/// Format seconds for the subtitle breakdown, one decimal ("2.5s").
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.1}s", seconds)
}

/// Format a subtitle range for display ("0.0s -> 2.0s").
pub fn format_range(start: f64, end: f64) -> String {
    format!("{} -> {}", format_seconds(start), format_seconds(end))
}
