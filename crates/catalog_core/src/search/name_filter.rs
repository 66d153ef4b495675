//! Case-insensitive product name filtering.

use crate::model::product::Product;

/// Returns products whose name contains `query`, ignoring case.
///
/// A blank query matches everything. Otherwise the query is matched as
/// typed, surrounding whitespace included. Results keep the input order.
pub fn filter_by_name(products: &[Product], query: &str) -> Vec<Product> {
    if query.trim().is_empty() {
        return products.to_vec();
    }
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|product| product.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
