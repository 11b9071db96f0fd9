//! Compare the references SKILL.md mentions with the documents on disk.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use super::file::SKILL_FILE;
use crate::manifest::MANIFEST_FILE;

const UNCATEGORIZED_HEADING: &str = "### Uncategorized (New)";
const UNCATEGORIZED_MARKER: &str = "<!-- Review and move these to appropriate sections -->";

/// Result of comparing SKILL.md references with the references directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Referenced in SKILL.md but missing on disk.
    pub orphaned: Vec<String>,
    /// On disk but never referenced in SKILL.md.
    pub unreferenced: Vec<String>,
    /// Referenced custom (locally maintained) documents.
    pub custom: Vec<String>,
}

impl SyncReport {
    pub fn is_in_sync(&self) -> bool {
        self.orphaned.is_empty() && self.unreferenced.is_empty()
    }
}

/// Compare referenced and present file names. The manifest file is never orphaned or
/// unreferenced; custom files are never orphaned.
pub fn check_sync(
    referenced: &BTreeSet<String>,
    present: &BTreeSet<String>,
    custom: &[String],
) -> SyncReport {
    let is_custom = |name: &str| custom.iter().any(|c| c == name);
    SyncReport {
        orphaned: referenced
            .iter()
            .filter(|r| !present.contains(*r) && r.as_str() != MANIFEST_FILE && !is_custom(r.as_str()))
            .cloned()
            .collect(),
        unreferenced: present
            .iter()
            .filter(|p| !referenced.contains(*p) && p.as_str() != MANIFEST_FILE)
            .cloned()
            .collect(),
        custom: referenced.iter().filter(|r| is_custom(r.as_str())).cloned().collect(),
    }
}

/// Names of the markdown documents in `references_dir`, plus the manifest file name.
/// A missing directory counts as empty.
pub fn present_references(references_dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    names.insert(MANIFEST_FILE.to_string());
    let read_dir = match std::fs::read_dir(references_dir) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("references directory not found: {}", references_dir.display());
            return Ok(names);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", references_dir.display()))
        }
    };
    for entry in read_dir.flatten() {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.insert(name.to_string());
        }
    }
    Ok(names)
}

/// Append files to the "Uncategorized (New)" section at the end of SKILL.md, creating the
/// section when it does not exist yet.
pub fn append_uncategorized(skill_dir: &Path, new_files: &[String]) -> Result<()> {
    if new_files.is_empty() {
        return Ok(());
    }
    let path = skill_dir.join(SKILL_FILE);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut out = content.trim_end().to_string();
    if !content.contains(UNCATEGORIZED_HEADING) {
        out.push_str("\n\n");
        out.push_str(UNCATEGORIZED_HEADING);
        out.push_str("\n\n");
        out.push_str(UNCATEGORIZED_MARKER);
        out.push('\n');
    }
    out.push('\n');
    for file in new_files {
        out.push_str(&format!(
            "- `references/{}` - (new, needs categorization)\n",
            file
        ));
    }

    std::fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "added {} new files to the uncategorized section of {}",
        new_files.len(),
        path.display()
    );
    Ok(())
}
