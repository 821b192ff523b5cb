//! Gemini image generation
//!
//! Provides:
//! - The `ImageGenerator` seam the studio drives
//! - Request shaping for the `generateContent` REST call
//! - A reqwest-backed client
//!
//! Generation fails soft: `generate_or_none` never surfaces an error to the
//! caller. The typed `ImageGenerator::generate` result keeps "no image" and
//! "failed" apart for callers that care.

mod client;
mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::image_data::ReferenceImage;

pub use client::GeminiClient;
pub use wire::{
    build_request, extract_image, Candidate, Content, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, ImageConfig, InlineData, Part,
};

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Model ids that accept image configuration (matched as substrings)
pub const IMAGE_MODELS: &[&str] = &["gemini-2.5-flash-image", "gemini-3-pro-image-preview"];

/// Aspect ratios the provider accepts
pub const SUPPORTED_ASPECT_RATIOS: &[&str] = &["1:1", "3:4", "4:3", "9:16", "16:9"];

/// Whether a model id is one of the image-capable models
pub fn is_image_model(model: &str) -> bool {
    IMAGE_MODELS.iter().any(|m| model.contains(m))
}

/// Whether an aspect ratio can be forwarded verbatim
pub fn is_supported_aspect_ratio(ratio: &str) -> bool {
    SUPPORTED_ASPECT_RATIOS.contains(&ratio)
}

/// Everything a single generation call needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub reference_images: Vec<ReferenceImage>,
    /// Aspect ratio hint, possibly `Auto` or unsupported
    pub aspect_ratio: String,
    pub model: String,
    /// Seed to forward; `None` means unset
    pub seed: Option<u32>,
}

/// Successful call outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Image as a data URI
    Image(String),
    /// The model answered without an image
    Empty,
}

/// Generation failures
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Gemini API key not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Malformed(String),
}

/// An image generation backend
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Issue one generation call
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError>;

    /// Whether the backend has what it needs to make calls
    fn is_configured(&self) -> bool {
        true
    }
}

/// Generate an image, returning `None` for both an empty answer and a
/// failure. Failures are logged.
pub async fn generate_or_none(
    generator: &dyn ImageGenerator,
    request: &GenerationRequest,
) -> Option<String> {
    match generator.generate(request).await {
        Ok(GenerationOutcome::Image(uri)) => Some(uri),
        Ok(GenerationOutcome::Empty) => {
            info!("Model {} produced no image", request.model);
            None
        }
        Err(e) => {
            error!("Image generation failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(fn() -> Result<GenerationOutcome, GenerationError>);

    #[async_trait]
    impl ImageGenerator for Fixed {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationOutcome, GenerationError> {
            (self.0)()
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "a lighthouse".to_string(),
            reference_images: Vec::new(),
            aspect_ratio: "Auto".to_string(),
            model: DEFAULT_MODEL.to_string(),
            seed: None,
        }
    }

    #[test]
    fn test_image_model_detection() {
        assert!(is_image_model("gemini-2.5-flash-image"));
        assert!(is_image_model("models/gemini-3-pro-image-preview"));
        assert!(is_image_model("gemini-2.5-flash-image-preview"));
        assert!(!is_image_model("gemini-2.5-pro"));
        assert!(!is_image_model(""));
    }

    #[test]
    fn test_aspect_ratio_allow_list() {
        assert!(is_supported_aspect_ratio("16:9"));
        assert!(is_supported_aspect_ratio("3:4"));
        assert!(!is_supported_aspect_ratio("Auto"));
        assert!(!is_supported_aspect_ratio("2:1"));
        assert!(!is_supported_aspect_ratio("3:2"));
    }

    #[tokio::test]
    async fn test_generate_or_none_image() {
        let generator = Fixed(|| Ok(GenerationOutcome::Image("data:image/png;base64,AA".into())));
        assert_eq!(
            generate_or_none(&generator, &request()).await,
            Some("data:image/png;base64,AA".to_string())
        );
    }

    #[tokio::test]
    async fn test_generate_or_none_conflates_empty_and_error() {
        let empty = Fixed(|| Ok(GenerationOutcome::Empty));
        assert_eq!(generate_or_none(&empty, &request()).await, None);

        let failing = Fixed(|| Err(GenerationError::NotConfigured));
        assert_eq!(generate_or_none(&failing, &request()).await, None);
    }
}
