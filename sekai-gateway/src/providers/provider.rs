//! Chat completion seam used by the lesson generators.

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("No content in response")]
    NoContent,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// One system prompt and one user turn in, assistant text out.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}
