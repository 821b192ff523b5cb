//! In-memory library of categories and assets
//!
//! Every asset's category must name an existing category. Mutating
//! operations validate first and leave the library untouched on error.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use super::{Asset, AssetDraft, Category, CategoryDraft};

/// Library validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("a category named '{0}' already exists")]
    DuplicateCategory(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),
}

/// Categories plus assets, both in insertion order
#[derive(Debug, Clone, Default)]
pub struct Library {
    categories: Vec<Category>,
    assets: Vec<Asset>,
}

impl Library {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library seeded with the built-in categories and example asset
    pub fn with_defaults() -> Self {
        Self {
            categories: Category::defaults(),
            assets: vec![Asset::cyber_samurai()],
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Assets of one category
    pub fn assets_in(&self, category: &str) -> Vec<&Asset> {
        self.assets
            .iter()
            .filter(|a| a.category == category)
            .collect()
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Add a category
    ///
    /// Names are trimmed and must be unique ignoring case.
    pub fn add_category(&mut self, draft: &CategoryDraft) -> Result<Category, LibraryError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(LibraryError::MissingField("category name"));
        }
        if self
            .categories
            .iter()
            .any(|c| c.name.to_lowercase() == name.to_lowercase())
        {
            return Err(LibraryError::DuplicateCategory(name.to_string()));
        }

        let category = Category::new(name, draft.description.trim());
        self.categories.push(category.clone());
        info!("Added category '{}'", category.name);
        Ok(category)
    }

    /// Delete a category and every asset in it
    ///
    /// Returns the ids of the removed assets.
    pub fn delete_category(&mut self, name: &str) -> Result<Vec<String>, LibraryError> {
        if !self.has_category(name) {
            return Err(LibraryError::CategoryNotFound(name.to_string()));
        }

        self.categories.retain(|c| c.name != name);

        let mut removed = Vec::new();
        self.assets.retain(|a| {
            if a.category == name {
                removed.push(a.id.clone());
                false
            } else {
                true
            }
        });

        info!(
            "Deleted category '{}' and {} asset(s)",
            name,
            removed.len()
        );
        Ok(removed)
    }

    /// Check the asset form; returns the trimmed (name, prompt)
    fn validate_draft<'a>(&self, draft: &'a AssetDraft) -> Result<(&'a str, &'a str), LibraryError> {
        let name = draft.name.trim();
        let prompt = draft.prompt.trim();

        if name.is_empty() {
            return Err(LibraryError::MissingField("name"));
        }
        if draft.category.is_empty() {
            return Err(LibraryError::MissingField("category"));
        }
        if prompt.is_empty() {
            return Err(LibraryError::MissingField("prompt signature"));
        }
        if draft.image.is_empty() {
            return Err(LibraryError::MissingField("visual DNA image"));
        }
        if !self.has_category(&draft.category) {
            return Err(LibraryError::CategoryNotFound(draft.category.clone()));
        }

        Ok((name, prompt))
    }

    /// Create a new asset from a form
    pub fn create_asset(&mut self, draft: &AssetDraft) -> Result<Asset, LibraryError> {
        let (name, prompt) = self.validate_draft(draft)?;

        let asset = Asset {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: draft.category.clone(),
            description: String::new(),
            prompt_snippet: prompt.to_string(),
            image: Some(draft.image.clone()),
            tags: Vec::new(),
            created_at: Utc::now(),
        };

        self.assets.push(asset.clone());
        debug!("Created asset {} ('{}')", asset.id, asset.name);
        Ok(asset)
    }

    /// Replace the editable fields of an existing asset in place
    pub fn update_asset(&mut self, id: &str, draft: &AssetDraft) -> Result<Asset, LibraryError> {
        let (name, prompt) = self.validate_draft(draft)?;
        let (name, prompt) = (name.to_string(), prompt.to_string());

        let asset = self
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| LibraryError::AssetNotFound(id.to_string()))?;

        asset.name = name;
        asset.category = draft.category.clone();
        asset.prompt_snippet = prompt;
        asset.image = Some(draft.image.clone());

        debug!("Updated asset {}", id);
        Ok(asset.clone())
    }

    /// Remove one asset
    pub fn delete_asset(&mut self, id: &str) -> Result<Asset, LibraryError> {
        let pos = self
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| LibraryError::AssetNotFound(id.to_string()))?;

        let asset = self.assets.remove(pos);
        debug!("Deleted asset {}", id);
        Ok(asset)
    }
}
