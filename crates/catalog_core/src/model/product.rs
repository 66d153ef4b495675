//! Product domain model.
//!
//! # Responsibility
//! - Define the canonical catalog record and its create/update payload.
//! - Provide form-level validation used before drafts reach the repository.
//!
//! # Invariants
//! - `id` is opaque, stable and never rewritten after creation.
//! - `image` is an opaque reference (URL or device path) stored as-is.
//! - Only the service layer validates draft content; repositories do not.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque product identifier.
///
/// Seeded records use short numeric strings, created records use UUIDs.
pub type ProductId = String;

/// Canonical catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Sole lookup key, unique within the collection.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Remote URL or local file path of the product image.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Builds a record from an already assigned id and a draft.
    pub fn from_draft(id: impl Into<ProductId>, draft: ProductDraft) -> Self {
        Self {
            id: id.into(),
            name: draft.name,
            image: draft.image,
            description: draft.description,
        }
    }

    /// Replaces every mutable field with the draft's values, keeping `id`.
    pub fn apply_draft(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.image = draft.image;
        self.description = draft.description;
    }
}

/// Create/update payload: a product without its identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Validation errors for product form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftValidationError {
    /// Name is empty after trimming.
    EmptyName,
    /// Image reference is empty after trimming.
    EmptyImage,
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "product name is required"),
            Self::EmptyImage => write!(f, "product image reference is required"),
        }
    }
}

impl Error for DraftValidationError {}

impl ProductDraft {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the fields a product form requires.
    ///
    /// Name is checked before image so callers surface one message at a time.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        if self.name.trim().is_empty() {
            return Err(DraftValidationError::EmptyName);
        }
        if self.image.trim().is_empty() {
            return Err(DraftValidationError::EmptyImage);
        }
        Ok(())
    }

    /// Returns a copy with trimmed fields; a blank description becomes `None`.
    pub fn normalized(&self) -> Self {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Self {
            name: self.name.trim().to_string(),
            image: self.image.trim().to_string(),
            description,
        }
    }
}
