use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, MontajError};

// Defaults for fields added after the initial config format shipped
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub session: SessionConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analysis service base URL
    pub endpoint: String,
    /// Model identifier used for content analysis
    pub model: String,
    /// Environment variable holding the API credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Timeout for the analysis exchange in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Dwell between editing and completion in milliseconds
    pub completion_dwell_ms: u64,
    /// Maximum wait for video metadata resolution in seconds
    pub probe_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffprobe binary
    pub binary_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig {
                endpoint: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-3-flash-preview".to_string(),
                api_key_env: default_api_key_env(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            session: SessionConfig {
                completion_dwell_ms: 3000,
                probe_timeout_secs: 10,
            },
            media: MediaConfig {
                binary_path: "ffprobe".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MontajError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| MontajError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MontajError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MontajError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
