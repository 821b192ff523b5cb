//! Enhancer controls
//!
//! Nine fixed style dimensions, each holding one value from its option
//! catalog or the `Auto` sentinel. Dimension declaration order is the
//! canonical order used when composing prompts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel value meaning "no influence"
pub const AUTO: &str = "Auto";

/// Enhancer dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnhancerDimension {
    Style,
    Lighting,
    CameraAngle,
    Mood,
    ColorPalette,
    TextureMaterial,
    ArtistInfluence,
    Motion,
    AspectRatio,
}

impl EnhancerDimension {
    /// All dimensions in canonical order
    pub const ALL: [EnhancerDimension; 9] = [
        EnhancerDimension::Style,
        EnhancerDimension::Lighting,
        EnhancerDimension::CameraAngle,
        EnhancerDimension::Mood,
        EnhancerDimension::ColorPalette,
        EnhancerDimension::TextureMaterial,
        EnhancerDimension::ArtistInfluence,
        EnhancerDimension::Motion,
        EnhancerDimension::AspectRatio,
    ];

    /// Identifier form, as injected into prompts ("Cyberpunk Style")
    pub fn key(&self) -> &'static str {
        match self {
            EnhancerDimension::Style => "Style",
            EnhancerDimension::Lighting => "Lighting",
            EnhancerDimension::CameraAngle => "CameraAngle",
            EnhancerDimension::Mood => "Mood",
            EnhancerDimension::ColorPalette => "ColorPalette",
            EnhancerDimension::TextureMaterial => "TextureMaterial",
            EnhancerDimension::ArtistInfluence => "ArtistInfluence",
            EnhancerDimension::Motion => "Motion",
            EnhancerDimension::AspectRatio => "AspectRatio",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            EnhancerDimension::Style => "Style",
            EnhancerDimension::Lighting => "Lighting",
            EnhancerDimension::CameraAngle => "Camera Angle",
            EnhancerDimension::Mood => "Mood",
            EnhancerDimension::ColorPalette => "Color Palette",
            EnhancerDimension::TextureMaterial => "Texture",
            EnhancerDimension::ArtistInfluence => "Artist Influence",
            EnhancerDimension::Motion => "Motion",
            EnhancerDimension::AspectRatio => "Aspect Ratio",
        }
    }

    /// Allowed values, `Auto` first
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            EnhancerDimension::Style => &[
                AUTO,
                "Cinematic",
                "Photorealistic",
                "Digital Art",
                "3D Render",
                "Anime",
                "Cyberpunk",
                "Minimalism",
                "Surrealism",
                "Oil Painting",
                "Sketch",
                "Vaporwave",
            ],
            EnhancerDimension::Lighting => &[
                AUTO,
                "Golden Hour",
                "Studio Lighting",
                "Neon Glow",
                "Dramatic Shadows",
                "Soft Natural",
                "Moonlight",
                "Volumetric",
            ],
            EnhancerDimension::CameraAngle => &[
                AUTO,
                "Wide Angle",
                "Close-up",
                "Macro",
                "Low Angle",
                "Top Down",
                "Fisheye",
            ],
            EnhancerDimension::Mood => &[
                AUTO,
                "Energetic",
                "Calm/Zen",
                "Melancholic",
                "Mysterious",
                "Epic",
                "Whimsical",
                "Gritty",
            ],
            EnhancerDimension::ColorPalette => &[
                AUTO,
                "Monochromatic",
                "Complementary",
                "Cyberpunk Neon",
                "Pastel Dream",
                "Vintage Film",
            ],
            EnhancerDimension::TextureMaterial => &[
                AUTO,
                "Organic",
                "Polished Chrome",
                "Soft Velvet",
                "Liquid Metal",
                "Holographic",
            ],
            EnhancerDimension::ArtistInfluence => &[
                AUTO,
                "Salvador Dali",
                "Wes Anderson",
                "Greg Rutkowski",
                "Roger Deakins",
                "Hayao Miyazaki",
            ],
            EnhancerDimension::Motion => &[AUTO, "Static", "Subtle", "Dynamic", "Chaotic"],
            EnhancerDimension::AspectRatio => &[AUTO, "1:1", "16:9", "9:16", "4:3", "3:2"],
        }
    }

    /// Parse from the identifier form (case-insensitive)
    pub fn from_key(s: &str) -> Option<EnhancerDimension> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.key().eq_ignore_ascii_case(s))
    }
}

/// Errors from setting a control value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("unknown enhancer dimension: {0}")]
    UnknownDimension(String),

    #[error("'{value}' is not an option for {dimension}")]
    UnknownOption { dimension: String, value: String },
}

/// Mapping of every dimension to its current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlSet {
    values: BTreeMap<EnhancerDimension, String>,
}

impl ControlSet {
    /// All dimensions set to `Auto`
    pub fn new() -> Self {
        Self {
            values: EnhancerDimension::ALL
                .iter()
                .map(|d| (*d, AUTO.to_string()))
                .collect(),
        }
    }

    /// Current value of a dimension
    pub fn get(&self, dimension: EnhancerDimension) -> &str {
        self.values
            .get(&dimension)
            .map(String::as_str)
            .unwrap_or(AUTO)
    }

    /// Set a dimension, rejecting values outside its option catalog
    pub fn set(&mut self, dimension: EnhancerDimension, value: &str) -> Result<(), ControlError> {
        if !dimension.options().contains(&value) {
            return Err(ControlError::UnknownOption {
                dimension: dimension.key().to_string(),
                value: value.to_string(),
            });
        }
        self.values.insert(dimension, value.to_string());
        Ok(())
    }

    /// Non-`Auto` values in canonical order
    pub fn active(&self) -> Vec<(EnhancerDimension, &str)> {
        EnhancerDimension::ALL
            .iter()
            .map(|d| (*d, self.get(*d)))
            .filter(|(_, v)| *v != AUTO)
            .collect()
    }

    /// Aspect ratio hint for the generation call
    pub fn aspect_ratio(&self) -> &str {
        self.get(EnhancerDimension::AspectRatio)
    }
}

impl Default for ControlSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_auto() {
        let controls = ControlSet::new();
        for d in EnhancerDimension::ALL {
            assert_eq!(controls.get(d), AUTO);
        }
        assert!(controls.active().is_empty());
    }

    #[test]
    fn test_set_and_active_order() {
        let mut controls = ControlSet::new();
        controls.set(EnhancerDimension::Motion, "Dynamic").unwrap();
        controls.set(EnhancerDimension::Style, "Anime").unwrap();

        let active = controls.active();
        assert_eq!(
            active,
            vec![
                (EnhancerDimension::Style, "Anime"),
                (EnhancerDimension::Motion, "Dynamic"),
            ]
        );
    }

    #[test]
    fn test_set_rejects_unknown_option() {
        let mut controls = ControlSet::new();
        let err = controls
            .set(EnhancerDimension::Lighting, "Disco")
            .unwrap_err();
        assert_eq!(
            err,
            ControlError::UnknownOption {
                dimension: "Lighting".to_string(),
                value: "Disco".to_string(),
            }
        );
        assert_eq!(controls.get(EnhancerDimension::Lighting), AUTO);
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!(
            EnhancerDimension::from_key("cameraangle"),
            Some(EnhancerDimension::CameraAngle)
        );
        assert_eq!(
            EnhancerDimension::from_key("AspectRatio"),
            Some(EnhancerDimension::AspectRatio)
        );
        assert_eq!(EnhancerDimension::from_key("Camera Angle"), None);
    }

    #[test]
    fn test_every_catalog_starts_with_auto() {
        for d in EnhancerDimension::ALL {
            assert_eq!(d.options()[0], AUTO, "{}", d.label());
        }
    }

    #[test]
    fn test_serializes_as_key_map() {
        let mut controls = ControlSet::new();
        controls.set(EnhancerDimension::Mood, "Epic").unwrap();
        let json = serde_json::to_value(&controls).unwrap();
        assert_eq!(json["Mood"], "Epic");
        assert_eq!(json["Style"], "Auto");
    }
}
