use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analysis::AnalysisClientTrait;
use crate::config::SessionConfig;
use crate::error::{MontajError, Result};
use crate::media::{MediaProbeTrait, VideoProperties};
use crate::metadata::AnalysisResult;

/// Shown when a failure carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred during processing.";

/// Editing pipeline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    Idle,
    Uploading,
    Analyzing,
    Editing,
    Completed,
    Error,
}

/// The uploaded source video held by the current session.
///
/// The preview handle is a session-scoped copy whose path stands in for a
/// playback URL; dropping the asset removes the file, so a reset releases
/// the handle deterministically.
pub struct VideoAsset {
    pub path: PathBuf,
    preview: NamedTempFile,
    pub aspect_ratio: f64,
    pub media_type: String,
    /// Duration in seconds
    pub duration: f64,
}

impl VideoAsset {
    fn from_file(path: &Path, properties: VideoProperties) -> Result<Self> {
        let media_type = media_type_for(path)?;

        let preview = tempfile::Builder::new()
            .prefix("montaj-preview-")
            .tempfile()?;
        std::fs::copy(path, preview.path())?;

        Ok(Self {
            path: path.to_path_buf(),
            preview,
            aspect_ratio: properties.aspect_ratio(),
            media_type,
            duration: properties.duration,
        })
    }

    /// Locally-resolvable playback location for the preview copy. Valid only
    /// while the asset is held by the session.
    pub fn preview_url(&self) -> &Path {
        self.preview.path()
    }
}

/// Resolve the media type from the file extension.
fn media_type_for(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let media_type = match extension.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        _ => return Err(MontajError::UnsupportedFormat(extension)),
    };

    Ok(media_type.to_string())
}

/// Top-level controller sequencing one editing session.
///
/// Owns the video asset, the analysis result and the error message, and is
/// mutated only through `&mut self`, so transitions stay strictly sequential.
/// The epoch counter invalidates the completion dwell across resets: a timer
/// captured before a reset can never complete a superseded session.
pub struct EditorSession {
    id: Uuid,
    status: EditorStatus,
    source: Option<PathBuf>,
    video: Option<VideoAsset>,
    metadata: Option<AnalysisResult>,
    error_message: Option<String>,
    epoch: u64,
    config: SessionConfig,
    client: Box<dyn AnalysisClientTrait>,
    probe: Box<dyn MediaProbeTrait>,
}

impl EditorSession {
    pub fn new(
        config: SessionConfig,
        client: Box<dyn AnalysisClientTrait>,
        probe: Box<dyn MediaProbeTrait>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: EditorStatus::Idle,
            source: None,
            video: None,
            metadata: None,
            error_message: None,
            epoch: 0,
            config,
            client,
            probe,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> EditorStatus {
        self.status
    }

    pub fn video(&self) -> Option<&VideoAsset> {
        self.video.as_ref()
    }

    pub fn metadata(&self) -> Option<&AnalysisResult> {
        self.metadata.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Message for the error panel, with the generic fallback.
    pub fn user_message(&self) -> &str {
        self.error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
    }

    /// Accept a file selection. A selection while a prior pipeline is still
    /// held by the session forces an implicit reset first; overlapping
    /// pipelines are never allowed.
    pub fn select_file(&mut self, path: &Path) {
        if self.status != EditorStatus::Idle {
            debug!("File selected while busy, resetting session first");
            self.reset();
        }

        self.id = Uuid::new_v4();
        self.error_message = None;
        self.source = Some(path.to_path_buf());
        self.status = EditorStatus::Uploading;
        info!("Session {} ingesting {}", self.id, path.display());
    }

    /// Wait for the video metadata to resolve, bounded by the configured
    /// timeout, then store the asset and move on to analysis. Returns whether
    /// the transition applied.
    pub async fn resolve_video(&mut self) -> bool {
        if self.status != EditorStatus::Uploading {
            warn!("resolve_video ignored in status {:?}", self.status);
            return false;
        }

        let Some(path) = self.source.clone() else {
            self.fail(MontajError::InvalidVideo("no file selected".to_string()));
            return false;
        };

        let wait = Duration::from_secs(self.config.probe_timeout_secs);
        let probed = tokio::time::timeout(wait, self.probe.probe(&path)).await;
        let properties = match probed {
            Ok(Ok(properties)) => properties,
            Ok(Err(e)) => {
                self.fail(e);
                return false;
            }
            Err(_) => {
                self.fail(MontajError::InvalidVideo(format!(
                    "video metadata did not resolve within {}s",
                    self.config.probe_timeout_secs
                )));
                return false;
            }
        };

        match VideoAsset::from_file(&path, properties) {
            Ok(asset) => {
                info!(
                    "Session {} stored asset, aspect ratio {:.3}",
                    self.id, asset.aspect_ratio
                );
                self.video = Some(asset);
                self.status = EditorStatus::Analyzing;
                true
            }
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Run the analysis exchange and store the result. Returns whether the
    /// transition applied.
    pub async fn analyze(&mut self) -> bool {
        if self.status != EditorStatus::Analyzing {
            warn!("analyze ignored in status {:?}", self.status);
            return false;
        }

        let (path, media_type) = match &self.video {
            Some(asset) => (asset.path.clone(), asset.media_type.clone()),
            None => {
                self.fail(MontajError::InvalidVideo("no video asset held".to_string()));
                return false;
            }
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail(e.into());
                return false;
            }
        };

        if bytes.is_empty() {
            self.fail(MontajError::InvalidVideo("video file is empty".to_string()));
            return false;
        }

        // The client leaves media-type enforcement to us.
        if !media_type.starts_with("video/") {
            self.fail(MontajError::UnsupportedFormat(media_type));
            return false;
        }

        let analyzed = self.client.analyze(&bytes, &media_type).await;
        match analyzed {
            Ok(result) => {
                info!(
                    "Session {} analyzed: {} subtitles, {} silence cuts",
                    self.id,
                    result.subtitles.len(),
                    result.silence_cuts.len()
                );
                self.metadata = Some(result);
                self.status = EditorStatus::Editing;
                true
            }
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Epoch and duration for the completion dwell. The caller sleeps for the
    /// duration and then applies `complete_editing` with the epoch; a reset
    /// in between invalidates the epoch and the stale completion is refused.
    pub fn completion_dwell(&self) -> (u64, Duration) {
        (
            self.epoch,
            Duration::from_millis(self.config.completion_dwell_ms),
        )
    }

    /// Apply Editing -> Completed if the session has not been superseded.
    pub fn complete_editing(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.status != EditorStatus::Editing {
            debug!("Stale completion timer ignored");
            return false;
        }

        self.status = EditorStatus::Completed;
        info!("Session {} completed", self.id);
        true
    }

    /// Wait out the completion dwell in place. Returns whether the transition
    /// applied.
    pub async fn finish_editing(&mut self) -> bool {
        if self.status != EditorStatus::Editing {
            warn!("finish_editing ignored in status {:?}", self.status);
            return false;
        }

        let (epoch, dwell) = self.completion_dwell();
        tokio::time::sleep(dwell).await;
        self.complete_editing(epoch)
    }

    /// Drive the full pipeline for one file and return the final status.
    pub async fn run(&mut self, path: &Path) -> EditorStatus {
        self.select_file(path);
        if self.resolve_video().await && self.analyze().await {
            self.finish_editing().await;
        }
        self.status
    }

    /// Return to Idle from any state, releasing the preview handle and
    /// clearing the result and error. Idempotent.
    pub fn reset(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);

        if let Some(video) = self.video.take() {
            debug!("Releasing preview handle {}", video.preview_url().display());
        }

        self.source = None;
        self.metadata = None;
        self.error_message = None;
        self.status = EditorStatus::Idle;
    }

    /// Convert any pipeline failure into the Error state. One rule for every
    /// failure kind: whatever the pipeline accumulated is discarded.
    fn fail(&mut self, err: MontajError) {
        error!("Session {} pipeline failed: {}", self.id, err);

        self.source = None;
        self.video = None;
        self.metadata = None;

        let message = err.to_string();
        self.error_message = Some(if message.is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        });
        self.status = EditorStatus::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{SubtitleEntry, TimeRange, VideoFormat};
    use crate::playback::active_entry_at;
    use async_trait::async_trait;
    use mockall::mock;
    use std::io::Write;

    mock! {
        Client {}

        #[async_trait]
        impl AnalysisClientTrait for Client {
            async fn analyze(&self, video: &[u8], media_type: &str) -> Result<AnalysisResult>;
        }
    }

    mock! {
        Probe {}

        #[async_trait]
        impl MediaProbeTrait for Probe {
            async fn probe(&self, path: &Path) -> Result<VideoProperties>;
            fn check_availability(&self) -> Result<()>;
        }
    }

    /// Probe double whose metadata never resolves.
    struct HangingProbe;

    #[async_trait]
    impl MediaProbeTrait for HangingProbe {
        async fn probe(&self, _path: &Path) -> Result<VideoProperties> {
            std::future::pending().await
        }

        fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            completion_dwell_ms: 0,
            probe_timeout_secs: 10,
        }
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            detected_languages: vec!["French".to_string()],
            original_format: VideoFormat::Horizontal,
            rewritten_script: "wa alikom salam".to_string(),
            pacing_summary: String::new(),
            subtitles: vec![SubtitleEntry {
                start: 0.0,
                end: 2.0,
                text: "Hi".to_string(),
            }],
            silence_cuts: vec![TimeRange {
                start: 2.0,
                end: 3.0,
            }],
        }
    }

    fn landscape_properties() -> VideoProperties {
        VideoProperties {
            width: 1920,
            height: 1080,
            duration: 10.0,
        }
    }

    fn temp_video() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        file.write_all(b"not really mpeg4 but close enough").unwrap();
        file
    }

    fn success_session() -> EditorSession {
        let mut client = MockClient::new();
        client
            .expect_analyze()
            .returning(|_, _| Ok(sample_result()));

        let mut probe = MockProbe::new();
        probe.expect_probe().returning(|_| Ok(landscape_properties()));

        EditorSession::new(test_config(), Box::new(client), Box::new(probe))
    }

    #[tokio::test]
    async fn test_pipeline_transitions_in_order() {
        let file = temp_video();
        let mut session = success_session();
        assert_eq!(session.status(), EditorStatus::Idle);

        session.select_file(file.path());
        assert_eq!(session.status(), EditorStatus::Uploading);

        assert!(session.resolve_video().await);
        assert_eq!(session.status(), EditorStatus::Analyzing);
        let asset = session.video().unwrap();
        assert!((asset.aspect_ratio - 16.0 / 9.0).abs() < 1e-9);
        assert_eq!(asset.media_type, "video/mp4");

        assert!(session.analyze().await);
        assert_eq!(session.status(), EditorStatus::Editing);

        assert!(session.finish_editing().await);
        assert_eq!(session.status(), EditorStatus::Completed);

        // The result is stored verbatim and drives the synchronizer.
        let metadata = session.metadata().unwrap();
        assert_eq!(*metadata, sample_result());
        assert_eq!(
            active_entry_at(1.0, &metadata.subtitles).map(|e| e.text.as_str()),
            Some("Hi")
        );
        assert!(active_entry_at(2.5, &metadata.subtitles).is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_routes_to_error() {
        let file = temp_video();

        let mut client = MockClient::new();
        client.expect_analyze().returning(|_, _| {
            Err(MontajError::Transport("connection refused".to_string()))
        });
        let mut probe = MockProbe::new();
        probe.expect_probe().returning(|_| Ok(landscape_properties()));

        let mut session = EditorSession::new(test_config(), Box::new(client), Box::new(probe));
        let status = session.run(file.path()).await;

        assert_eq!(status, EditorStatus::Error);
        assert!(!session.user_message().is_empty());
        // Failure discards everything the pipeline accumulated.
        assert!(session.video().is_none());
        assert!(session.metadata().is_none());
    }

    #[tokio::test]
    async fn test_malformed_response_message() {
        let file = temp_video();

        let mut client = MockClient::new();
        client.expect_analyze().returning(|_, _| {
            Err(MontajError::MalformedResponse("missing subtitles".to_string()))
        });
        let mut probe = MockProbe::new();
        probe.expect_probe().returning(|_| Ok(landscape_properties()));

        let mut session = EditorSession::new(test_config(), Box::new(client), Box::new(probe));
        session.run(file.path()).await;

        assert_eq!(session.status(), EditorStatus::Error);
        assert!(session.user_message().contains("Invalid analysis data"));
    }

    #[tokio::test]
    async fn test_unplayable_file_routes_to_error() {
        let file = temp_video();

        let client = MockClient::new();
        let mut probe = MockProbe::new();
        probe.expect_probe().returning(|_| {
            Err(MontajError::InvalidVideo("no video stream found".to_string()))
        });

        let mut session = EditorSession::new(test_config(), Box::new(client), Box::new(probe));
        session.select_file(file.path());
        assert!(!session.resolve_video().await);

        assert_eq!(session.status(), EditorStatus::Error);
        assert!(session.user_message().contains("Not a playable video"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_resolution_times_out() {
        let file = temp_video();

        let client = MockClient::new();
        let mut session =
            EditorSession::new(test_config(), Box::new(client), Box::new(HangingProbe));

        session.select_file(file.path());
        assert!(!session.resolve_video().await);

        assert_eq!(session.status(), EditorStatus::Error);
        assert!(session.user_message().contains("did not resolve"));
    }

    #[tokio::test]
    async fn test_unrecognized_extension_rejected() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"plain text").unwrap();

        let client = MockClient::new();
        let mut probe = MockProbe::new();
        probe.expect_probe().returning(|_| Ok(landscape_properties()));

        let mut session = EditorSession::new(test_config(), Box::new(client), Box::new(probe));
        session.select_file(file.path());
        assert!(!session.resolve_video().await);
        assert_eq!(session.status(), EditorStatus::Error);
    }

    #[tokio::test]
    async fn test_stage_methods_guard_against_wrong_state() {
        let mut session = success_session();

        assert!(!session.resolve_video().await);
        assert!(!session.analyze().await);
        assert!(!session.finish_editing().await);
        assert_eq!(session.status(), EditorStatus::Idle);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent_and_releases_preview() {
        let file = temp_video();
        let mut session = success_session();

        let status = session.run(file.path()).await;
        assert_eq!(status, EditorStatus::Completed);

        let preview_path = session.video().unwrap().preview_url().to_path_buf();
        assert!(preview_path.exists());

        session.reset();
        assert_eq!(session.status(), EditorStatus::Idle);
        assert!(session.video().is_none());
        assert!(session.metadata().is_none());
        assert!(session.error_message().is_none());
        assert!(!preview_path.exists());

        session.reset();
        assert_eq!(session.status(), EditorStatus::Idle);
    }

    #[tokio::test]
    async fn test_reset_recovers_from_error() {
        let file = temp_video();

        let mut client = MockClient::new();
        client
            .expect_analyze()
            .returning(|_, _| Err(MontajError::Transport("quota exceeded".to_string())));
        let mut probe = MockProbe::new();
        probe.expect_probe().returning(|_| Ok(landscape_properties()));

        let mut session = EditorSession::new(test_config(), Box::new(client), Box::new(probe));
        session.run(file.path()).await;
        assert_eq!(session.status(), EditorStatus::Error);

        session.reset();
        assert_eq!(session.status(), EditorStatus::Idle);
        assert!(session.error_message().is_none());
    }

    #[tokio::test]
    async fn test_stale_dwell_cannot_complete_superseded_session() {
        let file = temp_video();
        let mut session = success_session();

        session.select_file(file.path());
        session.resolve_video().await;
        session.analyze().await;
        assert_eq!(session.status(), EditorStatus::Editing);

        let (epoch, _dwell) = session.completion_dwell();
        session.reset();

        assert!(!session.complete_editing(epoch));
        assert_eq!(session.status(), EditorStatus::Idle);
    }

    #[tokio::test]
    async fn test_new_selection_implicitly_resets() {
        let first = temp_video();
        let second = temp_video();
        let mut session = success_session();

        session.run(first.path()).await;
        assert_eq!(session.status(), EditorStatus::Completed);

        session.select_file(second.path());
        assert_eq!(session.status(), EditorStatus::Uploading);
        assert!(session.metadata().is_none());
        assert!(session.video().is_none());
    }

    #[test]
    fn test_media_type_for_known_extensions() {
        assert_eq!(
            media_type_for(Path::new("clip.MP4")).unwrap(),
            "video/mp4"
        );
        assert_eq!(
            media_type_for(Path::new("clip.webm")).unwrap(),
            "video/webm"
        );
        assert!(matches!(
            media_type_for(Path::new("notes.txt")),
            Err(MontajError::UnsupportedFormat(_))
        ));
    }
}
