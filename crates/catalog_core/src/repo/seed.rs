//! Built-in sample catalog used when no persisted state exists.

use crate::model::product::Product;

const SEED: &[(&str, &str, &str, &str)] = &[
    (
        "1",
        "iPhone 15 Pro",
        "https://images.unsplash.com/photo-1592750475338-74b7b21085ab?w=400",
        "Flagship smartphone with the A17 Pro chip",
    ),
    (
        "2",
        "MacBook Pro M3",
        "https://images.unsplash.com/photo-1541807084-5c52b6b3adef?w=400",
        "Professional laptop with the Apple M3 chip",
    ),
    (
        "3",
        "AirPods Pro",
        "https://images.unsplash.com/photo-1606220945770-b5b6c2c55bf1?w=400",
        "Wireless earbuds with active noise cancellation",
    ),
    (
        "4",
        "iPad Air",
        "https://images.unsplash.com/photo-1544244015-0df4b3ffc6b0?w=400",
        "Versatile tablet with a Retina display",
    ),
    (
        "5",
        "Apple Watch",
        "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=400",
        "Smartwatch with health tracking features",
    ),
];

/// Returns a fresh copy of the seed collection.
pub fn seed_products() -> Vec<Product> {
    SEED.iter()
        .map(|&(id, name, image, description)| Product {
            id: id.to_string(),
            name: name.to_string(),
            image: image.to_string(),
            description: Some(description.to_string()),
        })
        .collect()
}
