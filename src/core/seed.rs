//! Startup seeding from an external JSON document.
//!
//! The seed file has the shape `{"gptOutput": "..."}`. It is only read when
//! the store holds no record yet, and a bad or missing file never stops
//! startup.

use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use super::error::StoreError;
use super::store::ContentStore;

/// On-disk seed document
#[derive(Debug, Default, Deserialize)]
pub struct SeedDocument {
    #[serde(rename = "gptOutput", default)]
    pub gpt_output: Option<String>,
}

/// Read the seed text, treating a missing or null `gptOutput` as empty
pub async fn read_seed(path: &Path) -> Result<String, StoreError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|err| StoreError::SeedUnreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    let doc: SeedDocument =
        serde_json::from_str(&raw).map_err(|err| StoreError::SeedUnreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    Ok(doc.gpt_output.unwrap_or_default())
}

/// Read the seed text, falling back to empty content on any failure
pub async fn load_seed_or_empty(path: &Path) -> String {
    match read_seed(path).await {
        Ok(text) => text,
        Err(err) => {
            warn!("{}; seeding with empty content", err);
            String::new()
        }
    }
}

/// Create the record from the seed file if the store is still empty
pub async fn bootstrap(store: &dyn ContentStore, seed_path: &Path) -> Result<(), StoreError> {
    if store.is_initialized().await? {
        info!("Content record present, seed file not consulted");
        return Ok(());
    }

    let seed = load_seed_or_empty(seed_path).await;
    info!(
        "Seeding content record from {} ({} bytes)",
        seed_path.display(),
        seed.len()
    );
    store.initialize(&seed).await
}
