// src/update.rs
//! Pre-flight self-update download

use crate::error::{Result, UplinkError};
use std::path::Path;

/// Download a replacement binary and write it to `path`.
///
/// Runs before the pipeline starts, so a failure here is fatal rather than
/// something to skip past.
pub async fn download_binary(url: &str, path: &Path) -> Result<()> {
    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(UplinkError::Rejected {
            status: response.status().as_u16(),
            body: format!("binary download from {} failed", url),
        });
    }

    let bytes = response.bytes().await?;
    tokio::fs::write(path, &bytes).await?;

    Ok(())
}
