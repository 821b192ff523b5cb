//! Generation history and studio settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gemini::DEFAULT_MODEL;

/// One generated image
///
/// The prompt is a frozen copy; later asset edits never alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub id: String,
    /// Image as a data URI
    pub image: String,
    pub prompt: String,
    pub timestamp: DateTime<Utc>,
    /// Selected asset ids at generation time
    pub assets_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

/// Decoded image ready to hand out as a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDownload {
    pub mime_type: String,
    /// `visionary-<unix millis>.png`
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Rendering quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    Fast,
    #[default]
    Balanced,
    High,
}

/// Output resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1k")]
    OneK,
    #[serde(rename = "2k")]
    TwoK,
}

/// Studio settings
///
/// Quality and resolution are kept for the front end but are not sent to
/// the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub model: String,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub resolution: Resolution,
    /// Manual seed; zero or negative for random
    #[serde(default)]
    pub seed: i64,
}

impl Settings {
    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }

    /// Seed to forward, if one is set
    ///
    /// The provider takes an int32, so larger seeds are capped.
    pub fn seed(&self) -> Option<u32> {
        if self.seed <= 0 {
            return None;
        }
        u32::try_from(self.seed.min(i64::from(i32::MAX))).ok()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            quality: Quality::default(),
            resolution: Resolution::default(),
            seed: 0,
        }
    }
}
