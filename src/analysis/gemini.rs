// Gemini generateContent implementation
//
// One request carries the whole video inline (base64) together with the
// editing brief, and asks for a JSON response constrained to the metadata
// schema.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::time::Duration;
use tracing::{debug, error, info};

use super::AnalysisClientTrait;
use crate::config::AnalysisConfig;
use crate::error::{MontajError, Result};
use crate::metadata::AnalysisResult;

static SYSTEM_INSTRUCTION: &str = r#"You are a senior AI video editor and script writer.
Process the input video and produce metadata for professional editing.

TASKS:
1. Detect every spoken language (Arabic, French, English, Darija).
2. Identify all silence or dead-air moments with start and end timestamps.
3. Understand the core message and drop filler words and repetitions.
4. Rewrite the script into clean, professional Moroccan Darija with a natural social media tone.
5. Generate impactful subtitles matching the speech timing.
6. Classify the video format: vertical for Reels/TikTok or horizontal for YouTube.

RULES:
- Primary output language is Darija.
- Format is either 9:16 (vertical) or 16:9 (horizontal).
- Subtitles must be short and impactful.
- Cut only dead space, never meaningful content.
"#;

static ANALYSIS_PROMPT: &str = "Analyze this video for professional editing. \
Provide silence timestamps, a rewritten Moroccan Darija script, and timed subtitles. \
Return as JSON.";

/// Gemini-backed analysis client
pub struct GeminiAnalysisClient {
    config: AnalysisConfig,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiAnalysisClient {
    /// Create a client with a validated credential. The API key is read from
    /// the configured environment variable once, at construction.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                MontajError::Config(format!(
                    "Analysis credential is not set: export {} before starting",
                    config.api_key_env
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model,
            self.api_key
        )
    }
}

#[async_trait]
impl AnalysisClientTrait for GeminiAnalysisClient {
    async fn analyze(&self, video: &[u8], media_type: &str) -> Result<AnalysisResult> {
        if video.is_empty() {
            return Err(MontajError::InvalidVideo(
                "video payload is empty".to_string(),
            ));
        }

        info!(
            "Requesting analysis for {} bytes of {} from model {}",
            video.len(),
            media_type,
            self.config.model
        );

        // Encoding a whole video is CPU-bound; keep it off the async threads.
        let payload = video.to_vec();
        let encoded = tokio::task::spawn_blocking(move || BASE64.encode(payload))
            .await
            .map_err(|e| MontajError::Transport(format!("payload encoding failed: {}", e)))?;

        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "inlineData": { "mimeType": media_type, "data": encoded } },
                    { "text": ANALYSIS_PROMPT }
                ]
            }],
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        let response = self
            .client
            .post(self.request_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| MontajError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MontajError::Transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            error!("Analysis service returned {}: {}", status, text);
            return Err(MontajError::Transport(format!("HTTP {}: {}", status, text)));
        }

        debug!("Raw analysis response: {}", text);

        let result = decode_analysis(&text)?;
        info!(
            "Analysis completed: {} subtitles, {} silence cuts, format {:?}",
            result.subtitles.len(),
            result.silence_cuts.len(),
            result.original_format
        );

        Ok(result)
    }
}

/// Response schema requested from the service, mirroring the metadata
/// contract. `pacingSummary` is the only non-required field.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "detectedLanguages": { "type": "ARRAY", "items": { "type": "STRING" } },
            "originalFormat": { "type": "STRING", "description": "'vertical' or 'horizontal'" },
            "rewrittenScript": { "type": "STRING" },
            "pacingSummary": { "type": "STRING" },
            "subtitles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "start": { "type": "NUMBER" },
                        "end": { "type": "NUMBER" },
                        "text": { "type": "STRING" }
                    },
                    "required": ["start", "end", "text"]
                }
            },
            "silenceCuts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "start": { "type": "NUMBER" },
                        "end": { "type": "NUMBER" }
                    },
                    "required": ["start", "end"]
                }
            }
        },
        "required": ["detectedLanguages", "originalFormat", "rewrittenScript", "subtitles", "silenceCuts"]
    })
}

/// Decode the service response body into a validated AnalysisResult. Every
/// failure on this path is a malformed response, never a transport error.
pub(crate) fn decode_analysis(body: &str) -> Result<AnalysisResult> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| MontajError::MalformedResponse(format!("response is not JSON: {}", e)))?;

    let text = extract_candidate_text(&value).ok_or_else(|| {
        MontajError::MalformedResponse("response carries no candidate text".to_string())
    })?;

    let result: AnalysisResult = serde_json::from_str(&text)
        .map_err(|e| MontajError::MalformedResponse(format!("metadata decode failed: {}", e)))?;

    result.validate()?;
    Ok(result)
}

/// Concatenate the text parts of the first candidate, if any.
fn extract_candidate_text(value: &serde_json::Value) -> Option<String> {
    let parts = value
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())?;

    let mut out = String::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
            out.push_str(text);
        }
    }

    if out.trim().is_empty() { None } else { Some(out) }
}
