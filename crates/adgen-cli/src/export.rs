//! Campaign export

use std::fs;
use std::path::Path;
use tracing::info;

use adgen_core::{Artifact, Campaign, Result};

/// Campaign record as pretty-printed JSON
pub fn campaign_json(campaign: &Campaign) -> Result<String> {
    Ok(serde_json::to_string_pretty(campaign)?)
}

/// Write the creative bytes to `path`, returning the number of bytes written
pub fn write_creative(artifact: &Artifact, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &artifact.bytes)?;
    info!(path = %path.display(), size = artifact.size(), "creative exported");
    Ok(artifact.size())
}

/// File extension matching a creative's MIME type
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => "bin",
    }
}
