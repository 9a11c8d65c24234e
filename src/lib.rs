//! tuck - durable append-only text register served over HTTP
//!
//! A single piece of text lives in a SQLite file. Callers can read it or
//! append a sentence to it; appends are serialized so none are lost.
//!
//! # Modules
//!
//! - `core`: ContentStore, schema and startup seeding
//! - `domain`: Trimming and joining rules for the content
//! - `api`: axum router for `/api/analysis`
//! - `config`: Layered configuration (flags, env, config file, defaults)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Serve the API on the default port (3000)
//! tuck serve
//!
//! # Read and append locally
//! tuck show
//! tuck append "another sentence"
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{ContentStore, SqliteContentStore, StoreError};
