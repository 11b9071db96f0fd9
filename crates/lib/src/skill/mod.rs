//! Skill bundle: SKILL.md parsing and reference bookkeeping.
//!
//! SKILL.md mentions reference documents as `references/<name>.md`; the sync check compares
//! those mentions with the files in the references directory.

mod file;
mod sync;

pub use file::{SkillFile, SKILL_FILE};
pub use sync::{append_uncategorized, check_sync, present_references, SyncReport};

use anyhow::Result;
use std::path::Path;

/// Load SKILL.md from `skill_dir` and compare its references with `references_dir`.
pub fn sync_report(skill_dir: &Path, references_dir: &Path, custom: &[String]) -> Result<SyncReport> {
    let skill = SkillFile::load(skill_dir)?;
    let present = present_references(references_dir)?;
    Ok(check_sync(&skill.references(), &present, custom))
}
