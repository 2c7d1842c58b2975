use thiserror::Error;

#[derive(Error, Debug)]
pub enum MontajError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not a playable video: {0}")]
    InvalidVideo(String),

    #[error("Analysis request failed: {0}")]
    Transport(String),

    #[error("Invalid analysis data received from AI: {0}")]
    MalformedResponse(String),

    #[error("Media probe error: {0}")]
    Probe(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, MontajError>;
