//! Library data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping of assets (e.g. Character, Place)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// Built-in categories a fresh library starts with
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new("Character", "Unique personas and biological identities."),
            Category::new("Place", "Environments and spatial locations."),
            Category::new("Object", "Key items, props, and artifacts."),
            Category::new("Outfit", "Clothing styles and wearable gear."),
            Category::new("Art Style", "Specific aesthetic signatures."),
            Category::new("Lighting", "Atmospheric illumination profiles."),
            Category::new("Mood", "Emotional tones and vibes."),
            Category::new("Color Palette", "Specific chromatic schemes."),
            Category::new("Composition", "Framing and structural arrangements."),
        ]
    }
}

/// A reusable visual DNA fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    /// Name of the owning category
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub prompt_snippet: String,
    /// Image URI, normally a data URI
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Example asset shipped with a fresh library
    pub fn cyber_samurai() -> Self {
        Self {
            id: "1".to_string(),
            name: "Cyber Samurai".to_string(),
            category: "Character".to_string(),
            description: "A robotic warrior with a glowing katana".to_string(),
            prompt_snippet: "a futuristic robotic samurai with neon pink glowing edges and a translucent katana".to_string(),
            image: Some("https://images.unsplash.com/photo-1614728263952-84ea206f99b6?auto=format&fit=crop&q=80&w=400".to_string()),
            tags: vec!["CHAR".to_string()],
            created_at: Utc::now(),
        }
    }
}

/// Category creation form
///
/// Missing keys deserialize as empty so validation reports them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

/// Asset create/edit form
///
/// All four fields are required; name and prompt are trimmed on save.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetDraft {
    pub name: String,
    pub category: String,
    pub prompt: String,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories() {
        let categories = Category::defaults();
        assert_eq!(categories.len(), 9);
        assert_eq!(categories[0].name, "Character");
        assert_eq!(categories[8].name, "Composition");
    }

    #[test]
    fn test_example_asset_references_default_category() {
        let asset = Asset::cyber_samurai();
        assert!(Category::defaults()
            .iter()
            .any(|c| c.name == asset.category));
    }

    #[test]
    fn test_drafts_tolerate_missing_keys() {
        let draft: AssetDraft =
            serde_json::from_value(serde_json::json!({ "name": "Castle" })).unwrap();
        assert_eq!(draft.name, "Castle");
        assert!(draft.image.is_empty());

        let draft: CategoryDraft =
            serde_json::from_value(serde_json::json!({ "description": "x" })).unwrap();
        assert!(draft.name.is_empty());
    }
}
