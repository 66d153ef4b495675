//! Flutter bridge for the product catalog core.

pub mod api;
