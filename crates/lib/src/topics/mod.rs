//! Topic index: map a topic name to the reference document that covers it.
//!
//! Entries come from the config file's `topics`, the "Key topics" table in SKILL.md,
//! or the built-in list, in that order. The index is immutable once built.

mod builtin;
mod index;
mod table;

use std::path::Path;

use crate::config::Config;
use crate::skill::SkillFile;

pub use builtin::key_topics;
pub use index::{IndexError, TopicEntry, TopicIndex, UnresolvedPathError};
pub use table::parse_topic_table;

/// Where the entries of a loaded index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicSource {
    /// The `topics` array in the config file.
    Config,
    /// The topics table in the skill's SKILL.md.
    SkillTable,
    /// The built-in key topics.
    Builtin,
}

impl std::fmt::Display for TopicSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopicSource::Config => write!(f, "config"),
            TopicSource::SkillTable => write!(f, "SKILL.md"),
            TopicSource::Builtin => write!(f, "built-in"),
        }
    }
}

/// Build the topic index for a skill directory.
pub fn load_topic_index(
    config: &Config,
    skill_dir: &Path,
) -> Result<(TopicIndex, TopicSource), IndexError> {
    if let Some(topics) = config.topics.as_ref().filter(|t| !t.is_empty()) {
        log::debug!("using {} topics from config", topics.len());
        return Ok((TopicIndex::new(topics.clone())?, TopicSource::Config));
    }

    match SkillFile::load(skill_dir) {
        Ok(skill) => {
            let entries = skill.topic_table(&config.topics_section);
            if !entries.is_empty() {
                log::debug!(
                    "using {} topics from {} ({})",
                    entries.len(),
                    skill.path.display(),
                    config.topics_section
                );
                return Ok((TopicIndex::new(entries)?, TopicSource::SkillTable));
            }
            log::debug!(
                "no \"{}\" table in {}, using built-in topics",
                config.topics_section,
                skill.path.display()
            );
        }
        Err(e) => log::debug!("no usable SKILL.md ({:#}), using built-in topics", e),
    }

    Ok((TopicIndex::new(key_topics())?, TopicSource::Builtin))
}
