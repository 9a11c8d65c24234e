//! Domain types for tuck.
//!
//! - Content: trimming and joining rules for the single text record

pub mod content;

pub use content::{join_content, trim_addition, SEPARATOR};
