//! `generateContent` request and response bodies

use serde::{Deserialize, Serialize};

use super::{is_image_model, is_supported_aspect_ratio, GenerationRequest};
use crate::image_data::DataUri;

/// Request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One turn of content
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A content part: text or inline binary data
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(alias = "inline_data", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: &str, data: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
        }
    }
}

/// Base64 payload with its mime type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

/// Response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

/// Shape the request body
///
/// Reference images that are not well-formed data URIs are dropped. The
/// text prompt is always the last part. Image configuration is only sent to
/// image-capable models.
pub fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
    let mut parts: Vec<Part> = request
        .reference_images
        .iter()
        .filter_map(|img| {
            DataUri::parse(&img.data)
                .ok()
                .map(|uri| Part::inline(&img.mime_type, &uri.payload))
        })
        .collect();

    parts.push(Part::text(&request.prompt));

    let generation_config = is_image_model(&request.model).then(|| GenerationConfig {
        image_config: Some(ImageConfig {
            aspect_ratio: is_supported_aspect_ratio(&request.aspect_ratio)
                .then(|| request.aspect_ratio.clone()),
        }),
        seed: request.seed,
    });

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config,
    }
}

/// First inline image of the first candidate, as a data URI
pub fn extract_image(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .find_map(|p| p.inline_data.as_ref())
        .map(|d| DataUri::from_base64(&d.mime_type, &d.data).to_string())
}
