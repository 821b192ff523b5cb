//! Gemini REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::wire::{build_request, extract_image, GenerateContentResponse};
use super::{GenerationError, GenerationOutcome, GenerationRequest, ImageGenerator};
use crate::config::GeminiConfig;

/// Gemini `generateContent` client
///
/// Stateless apart from the HTTP connection pool; safe to share and call
/// concurrently.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: Option<String>,
    /// API base URL, without trailing slash
    base_url: String,
}

impl GeminiClient {
    /// Create a client from configuration
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint for a model
    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(GenerationError::NotConfigured)?;

        let body = build_request(request);

        debug!(
            "Sending generateContent request to {} ({} part(s))",
            request.model,
            body.contents.first().map(|c| c.parts.len()).unwrap_or(0)
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API error: {} - {}", status, body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Malformed(e.to_string()))?;

        Ok(match extract_image(&parsed) {
            Some(uri) => GenerationOutcome::Image(uri),
            None => GenerationOutcome::Empty,
        })
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
