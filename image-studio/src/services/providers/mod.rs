//! Image generation provider abstraction.
//!
//! The relay talks to the upstream model through this trait so the handler
//! stays independent of Gemini's wire format.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
///
/// The two "upstream answered but gave us nothing usable" cases are kept as
/// distinct tags because the relay maps them to distinct user-facing
/// messages.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    /// The provider returned zero candidates.
    #[error("No image generated")]
    NoCandidates,

    /// The first candidate carried no inline image part.
    #[error("No image in response")]
    NoImagePart,
}

/// One image generation request, already validated by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: String,
    pub image_size: String,
    /// Raw base64 body of the source image (data-URI prefix already
    /// stripped), present only when editing.
    pub source_image: Option<String>,
}

/// A generated image: raw base64 PNG data plus the caption the model chose
/// to emit alongside it, if any.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub image_base64: String,
    pub caption: Option<String>,
}

/// Trait for multimodal image generation providers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Run one generation call with the given credential. Single attempt:
    /// retries and rate limiting are the caller's concern (currently
    /// nobody's, per design).
    async fn generate(
        &self,
        request: &ImageRequest,
        api_key: &str,
    ) -> Result<GeneratedImage, ProviderError>;
}
