//! Configuration for pixelize
//!
//! Provides types and loading for the optional `pixelize.toml` defaults file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
