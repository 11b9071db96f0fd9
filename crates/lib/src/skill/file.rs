//! SKILL.md: YAML frontmatter (name, description) plus a markdown body that
//! points at `references/` documents.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::topics::{parse_topic_table, TopicEntry};

pub const SKILL_FILE: &str = "SKILL.md";

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`?references/([^`\s]+\.(?:md|json))`?").expect("reference pattern is valid")
});

/// A loaded SKILL.md.
#[derive(Debug, Clone)]
pub struct SkillFile {
    pub name: String,
    pub description: String,
    pub path: PathBuf,
    /// Raw file content, frontmatter included.
    pub content: String,
}

/// Frontmatter parsed from SKILL.md (minimal).
#[derive(Debug, Default, Deserialize)]
struct SkillFrontmatter {
    name: Option<String>,
    description: Option<String>,
}

impl SkillFile {
    /// Read `<skill_dir>/SKILL.md`.
    pub fn load(skill_dir: &Path) -> Result<Self> {
        let path = skill_dir.join(SKILL_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Self::parse(content, skill_dir))
    }

    /// Parse SKILL.md content. Name falls back to the skill directory's name.
    pub fn parse(content: String, skill_dir: &Path) -> Self {
        let mut name = skill_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let mut description = String::new();

        if let Some((yaml, _)) = split_frontmatter(&content) {
            match serde_yaml::from_str::<SkillFrontmatter>(yaml) {
                Ok(fm) => {
                    if let Some(n) = fm.name {
                        name = n;
                    }
                    if let Some(d) = fm.description {
                        description = d;
                    }
                }
                Err(e) => log::warn!(
                    "invalid frontmatter in {}: {}",
                    skill_dir.join(SKILL_FILE).display(),
                    e
                ),
            }
        }

        Self {
            name,
            description,
            path: skill_dir.join(SKILL_FILE),
            content,
        }
    }

    /// Markdown after the frontmatter.
    pub fn body(&self) -> &str {
        split_frontmatter(&self.content)
            .map(|(_, body)| body)
            .unwrap_or(&self.content)
    }

    /// File names referenced as `references/<name>.md` or `.json` anywhere in the body.
    pub fn references(&self) -> BTreeSet<String> {
        REFERENCE_PATTERN
            .captures_iter(self.body())
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Topic rows from the table under `section`.
    pub fn topic_table(&self, section: &str) -> Vec<TopicEntry> {
        parse_topic_table(self.body(), Some(section))
    }
}

/// `---\n<yaml>\n---\n<body>` -> (yaml, body)
fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;
    if let Some(body) = rest.strip_prefix("---") {
        return Some(("", body.trim_start_matches(['\r', '\n'])));
    }
    let end = rest.find("\n---")?;
    let yaml = &rest[..end];
    let body = rest[end + 4..].trim_start_matches(['\r', '\n']);
    Some((yaml.trim(), body))
}
