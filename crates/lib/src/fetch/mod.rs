//! Mirror upstream Agent SDK documentation into the references directory.
//!
//! Pages are discovered (llms.txt, sitemaps, or the fallback list), fetched as markdown,
//! cleaned of MDX components, validated, saved, and recorded in docs_manifest.json.
//! Files from the previous manifest that were not fetched again are removed, unless nothing was fetched at all.

mod client;
mod discovery;
mod mdx;
mod urls;

pub use client::{DocsClient, FetchedDoc};
pub use discovery::{parse_llms_txt, parse_sitemap, Discoverer, Sitemap, FALLBACK_PAGES};
pub use mdx::{clean_mdx_content, validate_markdown_content, ContentError};
pub use urls::{is_agent_sdk_url, normalize_doc_url, url_to_safe_filename, AGENT_SDK_PATH_MARKERS};

use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use crate::config::{resolve_llms_urls, resolve_sitemap_urls, Config};
use crate::manifest::{cleanup_obsolete, save_document, FetchMetadata, Manifest};

const LOCK_FILE: &str = ".fetch.lock";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("content validation failed for {filename}: {source}")]
    Content {
        filename: String,
        #[source]
        source: ContentError,
    },
    #[error("failed to fetch {filename} after {attempts} attempts: {last_error}")]
    Exhausted {
        filename: String,
        attempts: u32,
        last_error: String,
    },
    #[error("sitemap parse error: {0}")]
    Sitemap(String),
}

/// Outcome of one mirror run.
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    pub successful: usize,
    pub failed: usize,
    pub failed_pages: Vec<String>,
    /// File names written this run.
    pub fetched_files: BTreeSet<String>,
    /// Obsolete files deleted this run.
    pub removed_files: Vec<String>,
}

/// Fetch every discovered page into `references_dir` and rewrite the manifest.
/// Holds an exclusive lock on `references_dir/.fetch.lock` for the whole run.
pub async fn fetch_docs(config: &Config, references_dir: &Path) -> Result<FetchSummary> {
    log::info!("starting documentation fetch into {}", references_dir.display());
    std::fs::create_dir_all(references_dir)
        .with_context(|| format!("creating {}", references_dir.display()))?;
    let _lock = lock_references_dir(references_dir)?;

    let previous = Manifest::load(references_dir);
    let client = DocsClient::new(&config.fetch).context("building HTTP client")?;
    let pages = Discoverer::new(&client, resolve_llms_urls(config), resolve_sitemap_urls(config))
        .discover()
        .await;

    let mut manifest = Manifest::default();
    let mut summary = FetchSummary::default();
    for (idx, page) in pages.iter().enumerate() {
        log::info!("processing {}/{}: {}", idx + 1, pages.len(), page);
        let saved = match client.fetch_markdown(page).await {
            Ok(doc) if config.custom_files.contains(&doc.filename) => {
                log::info!("skipping custom doc (preserved): {}", doc.filename);
                continue;
            }
            Ok(doc) => save_document(references_dir, &doc.filename, &doc.content)
                .map(|hash| (doc, hash)),
            Err(e) => Err(e.into()),
        };
        match saved {
            Ok((doc, hash)) => {
                manifest.record(doc.filename.clone(), doc.original_url, hash);
                summary.fetched_files.insert(doc.filename);
                summary.successful += 1;
            }
            Err(e) => {
                log::error!("failed to process {}: {:#}", page, e);
                summary.failed += 1;
                summary.failed_pages.push(page.clone());
            }
        }
    }

    if summary.successful == 0 && !previous.files.is_empty() {
        log::warn!(
            "no pages fetched; keeping {} previously mirrored files",
            previous.files.len()
        );
        manifest.files = previous.files.clone();
    } else {
        summary.removed_files = cleanup_obsolete(
            references_dir,
            &previous,
            &summary.fetched_files,
            &config.custom_files,
        );
    }
    manifest.fetch_metadata = Some(FetchMetadata {
        successful: summary.successful,
        failed: summary.failed,
        failed_pages: summary.failed_pages.clone(),
    });
    manifest.save(references_dir)?;

    log::info!(
        "fetch completed: {} successful, {} failed",
        summary.successful,
        summary.failed
    );
    Ok(summary)
}

/// Exclusive lock so two fetches never write the same references directory.
fn lock_references_dir(references_dir: &Path) -> Result<File> {
    let path = references_dir.join(LOCK_FILE);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    file.try_lock_exclusive().with_context(|| {
        format!(
            "another fetch is already running for {}",
            references_dir.display()
        )
    })?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lock_fails_while_first_is_held() {
        let dir = std::env::temp_dir().join(format!("skillref-lock-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = lock_references_dir(&dir).unwrap();
        assert!(lock_references_dir(&dir).is_err());
        drop(first);
        assert!(lock_references_dir(&dir).is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
