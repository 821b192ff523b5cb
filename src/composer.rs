//! Prompt composition
//!
//! Turns the selected assets, the enhancer controls and the free-text
//! prompt into one comma-joined prompt plus the reference images to attach.

use serde::Serialize;

use crate::controls::ControlSet;
use crate::image_data::{ReferenceImage, REFERENCE_MIME};
use crate::library::Asset;

/// Separator between prompt fragments
pub const FRAGMENT_SEPARATOR: &str = ", ";

/// Output of a composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPrompt {
    /// Fragments in emission order
    pub fragments: Vec<String>,
    /// Fragments joined with `", "`
    pub text: String,
    pub reference_images: Vec<ReferenceImage>,
}

impl ComposedPrompt {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Ordered prompt fragments: asset snippets, then active controls in
/// canonical order as `"<value> <key>"`, then the free text if non-empty
pub fn fragments(selected: &[&Asset], controls: &ControlSet, free_text: &str) -> Vec<String> {
    let mut parts: Vec<String> = selected
        .iter()
        .map(|a| a.prompt_snippet.clone())
        .collect();

    for (dimension, value) in controls.active() {
        parts.push(format!("{} {}", value, dimension.key()));
    }

    if !free_text.is_empty() {
        parts.push(free_text.to_string());
    }

    parts
}

/// Compose the prompt and reference payload
pub fn compose(
    selected: &[&Asset],
    controls: &ControlSet,
    free_text: &str,
    external_reference: Option<&str>,
) -> ComposedPrompt {
    let fragments = fragments(selected, controls, free_text);
    let text = fragments.join(FRAGMENT_SEPARATOR);

    let reference_images = external_reference
        .map(|data| vec![ReferenceImage::new(data, REFERENCE_MIME)])
        .unwrap_or_default();

    ComposedPrompt {
        fragments,
        text,
        reference_images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::EnhancerDimension;

    fn asset(snippet: &str) -> Asset {
        let mut asset = Asset::cyber_samurai();
        asset.prompt_snippet = snippet.to_string();
        asset
    }

    #[test]
    fn test_empty_inputs_compose_to_empty_string() {
        let composed = compose(&[], &ControlSet::new(), "", None);
        assert!(composed.is_empty());
        assert!(composed.fragments.is_empty());
        assert!(composed.reference_images.is_empty());
    }

    #[test]
    fn test_samurai_at_sunset() {
        let samurai = asset("a robotic samurai...");
        let mut controls = ControlSet::new();
        controls.set(EnhancerDimension::Style, "Cyberpunk").unwrap();

        let composed = compose(&[&samurai], &controls, "at sunset", None);
        assert_eq!(composed.text, "a robotic samurai..., Cyberpunk Style, at sunset");
    }

    #[test]
    fn test_fragment_count_and_order() {
        let a = asset("first");
        let b = asset("second");
        let mut controls = ControlSet::new();
        controls.set(EnhancerDimension::AspectRatio, "16:9").unwrap();
        controls.set(EnhancerDimension::CameraAngle, "Macro").unwrap();
        controls.set(EnhancerDimension::Lighting, "Moonlight").unwrap();

        let composed = compose(&[&b, &a], &controls, "extra", None);
        assert_eq!(
            composed.fragments,
            vec![
                "second",
                "first",
                "Moonlight Lighting",
                "Macro CameraAngle",
                "16:9 AspectRatio",
                "extra",
            ]
        );
        assert_eq!(composed.text.split(FRAGMENT_SEPARATOR).count(), 2 + 3 + 1);
    }

    #[test]
    fn test_controls_only() {
        let mut controls = ControlSet::new();
        controls.set(EnhancerDimension::Mood, "Epic").unwrap();
        assert_eq!(compose(&[], &controls, "", None).text, "Epic Mood");
    }

    #[test]
    fn test_compose_is_deterministic() {
        let a = asset("snippet");
        let mut controls = ControlSet::new();
        controls.set(EnhancerDimension::Motion, "Chaotic").unwrap();

        let first = compose(&[&a], &controls, "text", Some("data:image/png;base64,AA"));
        let second = compose(&[&a], &controls, "text", Some("data:image/png;base64,AA"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_reference_tagged_as_jpeg() {
        let composed = compose(&[], &ControlSet::new(), "x", Some("data:image/png;base64,AA"));
        assert_eq!(
            composed.reference_images,
            vec![ReferenceImage::new("data:image/png;base64,AA", "image/jpeg")]
        );
    }
}
