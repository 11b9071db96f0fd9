//! docs_manifest.json: what was mirrored into the references directory, from where, and its hash.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const MANIFEST_FILE: &str = "docs_manifest.json";

const MANIFEST_DESCRIPTION: &str = "Agent SDK documentation manifest maintained by skillref.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// file name -> entry
    #[serde(default)]
    pub files: BTreeMap<String, ManifestFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_metadata: Option<FetchMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub original_url: String,
    /// Hex SHA-256 of the saved content.
    pub hash: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchMetadata {
    pub successful: usize,
    pub failed: usize,
    #[serde(default)]
    pub failed_pages: Vec<String>,
}

impl Manifest {
    /// Load the manifest from `references_dir`. Missing or unreadable => empty manifest.
    pub fn load(references_dir: &Path) -> Self {
        let path = references_dir.join(MANIFEST_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("failed to load manifest {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Stamp `last_updated` and the description, then write pretty JSON.
    pub fn save(&mut self, references_dir: &Path) -> Result<()> {
        self.last_updated = Some(now());
        self.description = Some(MANIFEST_DESCRIPTION.to_string());
        let path = references_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).context("serializing manifest")?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Record a saved document.
    pub fn record(&mut self, filename: impl Into<String>, original_url: impl Into<String>, hash: impl Into<String>) {
        self.files.insert(
            filename.into(),
            ManifestFile {
                original_url: original_url.into(),
                hash: hash.into(),
                last_updated: now(),
            },
        );
    }
}

pub(crate) fn now() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Hex SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Write a document into `references_dir` and return its hash.
pub fn save_document(references_dir: &Path, filename: &str, content: &str) -> Result<String> {
    let path = references_dir.join(filename);
    std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    log::info!("saved {}", filename);
    Ok(content_hash(content))
}

/// Delete files listed in `previous` that were not fetched this time. The manifest file
/// and custom files are kept. Returns the names that were removed.
pub fn cleanup_obsolete(
    references_dir: &Path,
    previous: &Manifest,
    current: &BTreeSet<String>,
    custom: &[String],
) -> Vec<String> {
    let mut removed = Vec::new();
    for filename in previous.files.keys() {
        if current.contains(filename)
            || filename == MANIFEST_FILE
            || custom.iter().any(|c| c == filename)
        {
            continue;
        }
        let path = references_dir.join(filename);
        if !path.exists() {
            continue;
        }
        log::info!("removing obsolete file: {}", filename);
        match std::fs::remove_file(&path) {
            Ok(()) => removed.push(filename.clone()),
            Err(e) => log::warn!("failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}
