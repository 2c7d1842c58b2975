// Modular analysis client architecture
//
// This module wraps the single outbound exchange with the external
// content-understanding service behind a trait:
// - Gemini: generateContent with inline video data and a schema-constrained
//   JSON response
//
// To add another analysis provider, implement AnalysisClientTrait for it and
// extend the factory.

pub mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiAnalysisClient;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::metadata::AnalysisResult;

/// Main trait for the content-analysis exchange
#[async_trait]
pub trait AnalysisClientTrait: Send + Sync {
    /// Run exactly one analysis request for the given video payload and
    /// return the validated metadata, or a typed failure. Stateless between
    /// invocations; never retried automatically.
    async fn analyze(&self, video: &[u8], media_type: &str) -> Result<AnalysisResult>;
}

/// Factory for creating analysis client instances
pub struct AnalysisClientFactory;

impl AnalysisClientFactory {
    /// Create the default analysis client (Gemini-based). Fails fast when
    /// the configured credential is absent.
    pub fn create_client(config: AnalysisConfig) -> Result<Box<dyn AnalysisClientTrait>> {
        Ok(Box::new(GeminiAnalysisClient::new(config)?))
    }
}
