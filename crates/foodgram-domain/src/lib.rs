//! Domain types shared across Foodgram services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Safe to import from any layer.

pub mod pagination;
