//! The topic index itself: an ordered, immutable list of entries with a
//! case-folded lookup table built once at construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One row of the topic table: which reference document covers a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    topic: String,
    description: String,
    path: String,
}

impl TopicEntry {
    pub fn new(
        topic: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            description: description.into(),
            path: path.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Path of the reference document, relative to the skill directory.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("duplicate topic: {topic}")]
    DuplicateTopic { topic: String },
    #[error("topic entry {position} has an empty topic")]
    EmptyTopic { position: usize },
}

/// A topic whose reference document could not be opened. Reported by
/// [`TopicIndex::validate`]; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("topic {topic}: {path} could not be resolved ({reason})")]
pub struct UnresolvedPathError {
    pub topic: String,
    pub path: String,
    pub reason: String,
}

/// Immutable topic -> reference document index. Entries keep declaration order.
#[derive(Debug, Clone, Default)]
pub struct TopicIndex {
    entries: Vec<TopicEntry>,
    /// folded topic -> position in `entries`
    by_topic: HashMap<String, usize>,
}

impl TopicIndex {
    /// Build the index. Topics are compared case-insensitively, so "MCP" and "mcp" collide.
    pub fn new(entries: Vec<TopicEntry>) -> Result<Self, IndexError> {
        let mut by_topic = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let key = fold(entry.topic());
            if key.is_empty() {
                return Err(IndexError::EmptyTopic { position });
            }
            if by_topic.insert(key, position).is_some() {
                return Err(IndexError::DuplicateTopic {
                    topic: entry.topic().to_string(),
                });
            }
        }
        Ok(Self { entries, by_topic })
    }

    /// Exact, case-insensitive lookup. `None` means no such topic.
    pub fn lookup(&self, topic: &str) -> Option<&TopicEntry> {
        self.by_topic
            .get(&fold(topic))
            .map(|&position| &self.entries[position])
    }

    /// Entries whose topic starts with `prefix` (case-insensitive), in declaration order.
    pub fn lookup_prefix(&self, prefix: &str) -> Vec<&TopicEntry> {
        let prefix = fold(prefix);
        self.entries
            .iter()
            .filter(|e| fold(e.topic()).starts_with(&prefix))
            .collect()
    }

    /// All entries in declaration order.
    pub fn list(&self) -> &[TopicEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every entry's path resolves to a readable file under `root`.
    /// Returns one error per unresolved entry, in declaration order.
    pub fn validate(&self, root: &Path) -> Vec<UnresolvedPathError> {
        self.entries
            .iter()
            .filter_map(|e| check_path(root, e).err())
            .collect()
    }
}

fn fold(topic: &str) -> String {
    topic.trim().to_lowercase()
}

fn check_path(root: &Path, entry: &TopicEntry) -> Result<(), UnresolvedPathError> {
    let unresolved = |reason: String| UnresolvedPathError {
        topic: entry.topic().to_string(),
        path: entry.path().to_string(),
        reason,
    };
    let full = root.join(entry.path());
    let meta = std::fs::metadata(&full).map_err(|e| unresolved(e.to_string()))?;
    if !meta.is_file() {
        return Err(unresolved("not a regular file".to_string()));
    }
    std::fs::File::open(&full).map_err(|e| unresolved(e.to_string()))?;
    Ok(())
}
