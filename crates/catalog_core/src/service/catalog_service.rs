//! Catalog use-case service.
//!
//! # Responsibility
//! - Validate and normalize product form input before it reaches the
//!   repository.
//! - Map repository failures to caller-facing errors.
//!
//! # Invariants
//! - Drafts with a blank name or image never reach the repository.
//! - Stored fields are trimmed; a blank description is stored as absent.

use crate::model::product::{DraftValidationError, Product, ProductDraft, ProductId};
use crate::repo::product_repo::{ProductRepository, RepoError};
use crate::search::name_filter::filter_by_name;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogServiceError {
    /// Form input failed validation.
    InvalidDraft(DraftValidationError),
    /// Target product no longer exists.
    ProductNotFound(ProductId),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDraft(err) => write!(f, "{err}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDraft(err) => Some(err),
            Self::ProductNotFound(_) => None,
        }
    }
}

impl From<DraftValidationError> for CatalogServiceError {
    fn from(value: DraftValidationError) -> Self {
        Self::InvalidDraft(value)
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ProductNotFound(id),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogServiceError>;

/// Use-case wrapper around the shared product repository.
#[derive(Clone)]
pub struct CatalogService {
    repo: ProductRepository,
}

impl CatalogService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &ProductRepository {
        &self.repo
    }

    /// Lists products, optionally filtered by a name query.
    pub fn search(&self, query: Option<&str>) -> Vec<Product> {
        let products = self.repo.list();
        match query {
            Some(query) => filter_by_name(&products, query),
            None => products,
        }
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        self.repo.get(id)
    }

    pub fn add_product(&self, draft: &ProductDraft) -> CatalogResult<Product> {
        draft.validate()?;
        Ok(self.repo.create(draft.normalized()))
    }

    /// Replaces an existing product's fields.
    ///
    /// Validation runs before the existence check, mirroring form submit order.
    pub fn edit_product(&self, id: &str, draft: &ProductDraft) -> CatalogResult<Product> {
        draft.validate()?;
        Ok(self.repo.update(id, draft.normalized())?)
    }

    pub fn remove_product(&self, id: &str) -> CatalogResult<Product> {
        Ok(self.repo.delete(id)?)
    }
}
