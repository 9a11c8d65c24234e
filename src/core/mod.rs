//! Storage core.
//!
//! This module contains:
//! - ContentStore: the durable single-record text register
//! - Schema: SQLite layout and record access
//! - Seed: first-start seeding from an external JSON document

pub mod error;
pub mod schema;
pub mod seed;
pub mod store;

// Re-export commonly used types
pub use error::StoreError;
pub use seed::{bootstrap, load_seed_or_empty, read_seed, SeedDocument};
pub use store::{ContentStore, SqliteContentStore};
