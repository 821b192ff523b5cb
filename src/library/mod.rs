//! Visual DNA library
//!
//! Provides:
//! - Categories and the assets grouped under them
//! - Validated create/edit of assets
//! - Cascade delete of a category and its assets

mod asset;
mod store;

pub use asset::{Asset, AssetDraft, Category, CategoryDraft};
pub use store::{Library, LibraryError};
