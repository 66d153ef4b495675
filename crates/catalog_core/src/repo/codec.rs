//! Persisted blob format for the product collection.
//!
//! The blob is a JSON array of product objects in collection order.
//! `description` is omitted when absent.

use crate::model::product::{Product, ProductId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    /// Payload parsed but repeats an id, breaking collection uniqueness.
    DuplicateId(ProductId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid product payload: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate product id in payload: {id}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub fn encode_products(products: &[Product]) -> CodecResult<String> {
    Ok(serde_json::to_string(products)?)
}

/// Parses a persisted blob, rejecting payloads that would violate id
/// uniqueness instead of silently dropping records.
pub fn decode_products(raw: &str) -> CodecResult<Vec<Product>> {
    let products: Vec<Product> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(products.len());
    for product in &products {
        if !seen.insert(product.id.as_str()) {
            return Err(CodecError::DuplicateId(product.id.clone()));
        }
    }
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::{decode_products, encode_products, CodecError};
    use crate::repo::seed::seed_products;

    #[test]
    fn seed_roundtrips_in_order() {
        let seed = seed_products();
        let raw = encode_products(&seed).unwrap();
        assert_eq!(decode_products(&raw).unwrap(), seed);
    }

    #[test]
    fn absent_description_is_omitted_and_null_is_accepted() {
        let raw = r#"[{"id":"a","name":"n","image":"i","description":null}]"#;
        let products = decode_products(raw).unwrap();
        assert_eq!(products[0].description, None);

        let encoded = encode_products(&products).unwrap();
        assert!(!encoded.contains("description"));
    }

    #[test]
    fn rejects_non_array_and_missing_fields() {
        assert!(matches!(decode_products("null"), Err(CodecError::Json(_))));
        assert!(matches!(
            decode_products(r#"{"id":"a"}"#),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(
            decode_products(r#"[{"id":"a","name":"n"}]"#),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let raw = r#"[{"id":"a","name":"n","image":"i"},{"id":"a","name":"m","image":"j"}]"#;
        assert!(matches!(
            decode_products(raw),
            Err(CodecError::DuplicateId(id)) if id == "a"
        ));
    }
}
