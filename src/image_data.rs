//! Embedded image references
//!
//! Images travel through the studio as data URIs
//! (`data:<mime>;base64,<payload>`). This module parses and builds them and
//! turns raw uploaded bytes into one.

use std::fmt;
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mime type used when an upload carries no usable content type
pub const DEFAULT_UPLOAD_MIME: &str = "image/png";

/// Mime type the composer tags the external reference with
pub const REFERENCE_MIME: &str = "image/jpeg";

/// Errors from parsing a data URI
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    #[error("not a data URI")]
    MissingScheme,

    #[error("data URI has no payload")]
    MissingPayload,

    #[error("data URI payload is not valid base64")]
    InvalidBase64,
}

/// `data:` header up to and including the comma
static DATA_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(?P<mime>[\w.+-]+/[\w.+-]+)?(?P<params>(;[^;,]*)*),(?P<payload>.*)$")
        .unwrap()
});

/// A parsed data URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUri {
    /// Mime type from the header, if one was given
    pub mime_type: Option<String>,
    /// Payload exactly as it appears after the comma
    pub payload: String,
    /// Whether the header declared `;base64`
    pub base64: bool,
}

impl DataUri {
    /// Parse a data URI, requiring the `data:` scheme and a non-empty payload
    pub fn parse(s: &str) -> Result<Self, DataUriError> {
        if !s.starts_with("data:") {
            return Err(DataUriError::MissingScheme);
        }
        let caps = DATA_URI_REGEX
            .captures(s)
            .ok_or(DataUriError::MissingPayload)?;

        let payload = caps.name("payload").map(|m| m.as_str()).unwrap_or("");
        if payload.is_empty() {
            return Err(DataUriError::MissingPayload);
        }

        let base64 = caps
            .name("params")
            .map(|m| m.as_str().split(';').any(|p| p == "base64"))
            .unwrap_or(false);

        Ok(Self {
            mime_type: caps.name("mime").map(|m| m.as_str().to_string()),
            payload: payload.to_string(),
            base64,
        })
    }

    /// Build a base64 data URI from an already base64-encoded payload
    pub fn from_base64(mime_type: &str, payload: &str) -> Self {
        Self {
            mime_type: Some(mime_type.to_string()),
            payload: payload.to_string(),
            base64: true,
        }
    }

    /// Encode raw bytes
    pub fn from_bytes(mime_type: &str, data: &[u8]) -> Self {
        Self::from_base64(mime_type, &BASE64.encode(data))
    }

    /// Decode the payload back to bytes (base64 payloads only)
    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        if !self.base64 {
            return Err(DataUriError::InvalidBase64);
        }
        BASE64
            .decode(self.payload.as_bytes())
            .map_err(|_| DataUriError::InvalidBase64)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{}", self.mime_type.as_deref().unwrap_or(""))?;
        if self.base64 {
            write!(f, ";base64")?;
        }
        write!(f, ",{}", self.payload)
    }
}

/// A reference image attached to a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    /// Data URI string as stored in the studio
    pub data: String,
    /// Mime type to declare to the provider
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Import an uploaded image file into a data URI string
///
/// No format sniffing is done; the declared content type is trusted and
/// falls back to PNG when missing or not an image type.
pub fn import_image(data: &[u8], content_type: Option<&str>) -> String {
    let mime_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim())
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or(DEFAULT_UPLOAD_MIME);

    DataUri::from_bytes(mime_type, data).to_string()
}
