//! Initialize a skill directory: default config, SKILL.md with the key topics table, and `references/`.
//!
//! Existing files are never overwritten.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;
use crate::skill::SKILL_FILE;

static DEFAULT_SKILL_MD: &str = include_str!("../config/SKILL.md");

/// Ensure the skill directory exists and holds a SKILL.md.
pub fn require_initialized(skill_dir: &Path) -> Result<()> {
    if !skill_dir.is_dir() {
        anyhow::bail!(
            "skill directory not found: {}; run `skillref init` first",
            skill_dir.display()
        );
    }
    let skill_md = skill_dir.join(SKILL_FILE);
    if !skill_md.exists() {
        anyhow::bail!(
            "{} not found; run `skillref init` first",
            skill_md.display()
        );
    }
    Ok(())
}

/// Create the skill directory and default files if they do not exist.
/// - Creates the skill directory (parent of the config file path, or `skillDir` from an existing config).
/// - Writes the config file with `{}` if missing.
/// - Seeds `SKILL.md` from the default template if missing.
/// - Creates the references directory.
///
/// Returns the skill directory.
pub fn init_skill_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let (cfg, _) = config::load_config(Some(config_path.to_path_buf()))?;
    let skill_dir = config::resolve_skill_dir(&cfg, config_path);
    std::fs::create_dir_all(&skill_dir)
        .with_context(|| format!("creating skill directory {}", skill_dir.display()))?;

    let skill_md = skill_dir.join(SKILL_FILE);
    if !skill_md.exists() {
        std::fs::write(&skill_md, DEFAULT_SKILL_MD)
            .with_context(|| format!("writing default SKILL.md to {}", skill_md.display()))?;
        log::info!("wrote default SKILL.md to {}", skill_md.display());
    } else {
        log::debug!("{} already exists, skipping", skill_md.display());
    }

    let references = config::resolve_references_dir(&cfg, &skill_dir);
    if !references.exists() {
        std::fs::create_dir_all(&references)
            .with_context(|| format!("creating references directory {}", references.display()))?;
        log::info!("created references directory at {}", references.display());
    }

    Ok(skill_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SkillFile;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("skillref-init-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn init_creates_layout() {
        let dir = temp_dir();
        let config_path = dir.join("skillref.json");
        let skill_dir = init_skill_dir(&config_path).unwrap();

        assert_eq!(skill_dir, dir);
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "{}");
        assert!(dir.join("references").is_dir());
        require_initialized(&skill_dir).unwrap();

        let skill = SkillFile::load(&skill_dir).unwrap();
        assert_eq!(skill.name, "agent-sdk");
        assert_eq!(skill.topic_table("Key topics").len(), 9);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn init_keeps_existing_files() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), "# Mine\n").unwrap();
        std::fs::write(dir.join("skillref.json"), r#"{"referencesDir": "docs"}"#).unwrap();

        init_skill_dir(&dir.join("skillref.json")).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("SKILL.md")).unwrap(), "# Mine\n");
        assert!(dir.join("docs").is_dir());
        assert!(!dir.join("references").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn uninitialized_dir_is_reported() {
        let dir = temp_dir();
        assert!(require_initialized(&dir).is_err());
        std::fs::create_dir_all(&dir).unwrap();
        assert!(require_initialized(&dir).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
