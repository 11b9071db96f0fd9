//! Parse topic entries out of GitHub-style pipe tables in a markdown document.
//!
//! Columns are matched by header name (topic/name, description/summary/use for,
//! path/file/reference/document) and fall back to positions 0, 1, 2.

use super::TopicEntry;

/// Read topic rows from the pipe tables in `markdown`.
///
/// When `section` is set, only tables below a heading with that title are read
/// (case-insensitive, a trailing `:` is ignored); the section ends at the next heading
/// of the same or a higher level. Rows with fewer than three cells, an empty topic,
/// or an empty path are skipped.
pub fn parse_topic_table(markdown: &str, section: Option<&str>) -> Vec<TopicEntry> {
    let mut out = Vec::new();
    let mut in_section = section.is_none();
    let mut section_level = 0;
    let mut in_fence = false;
    let mut columns: Option<Columns> = None;
    let mut pending_header: Option<Vec<String>> = None;

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            columns = None;
            pending_header = None;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((level, title)) = heading(trimmed) {
            columns = None;
            pending_header = None;
            if let Some(wanted) = section {
                if in_section && level <= section_level {
                    in_section = false;
                }
                if !in_section && title_matches(title, wanted) {
                    in_section = true;
                    section_level = level;
                }
            }
            continue;
        }
        if !in_section {
            continue;
        }
        if !trimmed.starts_with('|') {
            columns = None;
            pending_header = None;
            continue;
        }

        let cells = split_row(trimmed);
        if let Some(cols) = &columns {
            if let Some(entry) = cols.entry(&cells) {
                out.push(entry);
            }
            continue;
        }
        match pending_header.take() {
            Some(header) if is_separator(&cells) => columns = Some(Columns::from_header(&header)),
            _ => pending_header = Some(cells),
        }
    }

    out
}

/// Positions of the topic, description, and path cells in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    topic: usize,
    description: usize,
    path: usize,
}

impl Columns {
    const POSITIONAL: Columns = Columns {
        topic: 0,
        description: 1,
        path: 2,
    };

    fn from_header(header: &[String]) -> Self {
        let find = |names: &[&str]| {
            header.iter().position(|h| {
                let h = clean_cell(h).to_lowercase();
                names.iter().any(|n| h.contains(n))
            })
        };
        let topic = find(&["topic", "name"]);
        let description = find(&["description", "summary", "use for"]);
        let path = find(&["path", "file", "reference", "document"]);
        let (topic, path) = match (topic, path) {
            (Some(topic), Some(path)) if topic != path => (topic, path),
            _ => return Self::POSITIONAL,
        };
        // an unrecognised description header takes the first remaining column
        let description = description
            .filter(|d| *d != topic && *d != path)
            .or_else(|| (0..header.len()).find(|i| *i != topic && *i != path));
        match description {
            Some(description) => Columns {
                topic,
                description,
                path,
            },
            None => Self::POSITIONAL,
        }
    }

    fn entry(&self, cells: &[String]) -> Option<TopicEntry> {
        if cells.len() < 3 {
            return None;
        }
        let topic_cell = cells.get(self.topic)?;
        let description = clean_cell(cells.get(self.description)?);
        let path_cell = cells.get(self.path)?;

        let topic = match split_link(topic_cell) {
            Some((text, _)) => clean_cell(text),
            None => clean_cell(topic_cell),
        };
        let path = match split_link(path_cell) {
            Some((_, target)) => clean_cell(target),
            None => clean_cell(path_cell),
        };
        if topic.is_empty() || path.is_empty() {
            return None;
        }
        Some(TopicEntry::new(topic, description, path))
    }
}

/// `## Title` -> (2, "Title")
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim().trim_end_matches('#').trim()))
}

fn title_matches(title: &str, wanted: &str) -> bool {
    let norm = |s: &str| s.trim().trim_end_matches(':').trim().to_lowercase();
    norm(title) == norm(wanted)
}

fn split_row(line: &str) -> Vec<String> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn is_separator(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|c| {
            !c.is_empty() && c.contains('-') && c.chars().all(|ch| matches!(ch, '-' | ':' | ' '))
        })
}

/// `[text](target)` -> (text, target)
fn split_link(cell: &str) -> Option<(&str, &str)> {
    let cell = cell.trim();
    let rest = cell.strip_prefix('[')?;
    let (text, rest) = rest.split_once("](")?;
    let target = rest.strip_suffix(')')?;
    Some((text, target))
}

fn clean_cell(cell: &str) -> String {
    let mut s = cell.trim();
    loop {
        let before = s;
        if let Some(inner) = s.strip_prefix("**").and_then(|r| r.strip_suffix("**")) {
            s = inner.trim();
        }
        if let Some(inner) = s.strip_prefix('`').and_then(|r| r.strip_suffix('`')) {
            s = inner.trim();
        }
        if s == before {
            return s.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Agent SDK

## Overview

| Topic | Description | Reference |
|-------|-------------|-----------|
| overview | Not a key topic | `references/overview.md` |

## Key topics

Read the matching reference before answering.

| Topic | Use for | Reference |
|:------|:--------|:----------|
| **permissions** | Approving tool use | `references/permissions.md` |
| [sessions](references/sessions.md) | Resuming work | [Sessions](references/sessions.md) |
| broken row |

### Details

| topic | description | path |
|---|---|---|
| hooks | Hook callbacks | references/hooks.md |

## Installation

| Topic | Description | Reference |
|---|---|---|
| install | Not a key topic | references/install.md |
";

    #[test]
    fn reads_only_the_named_section_and_its_subsections() {
        let entries = parse_topic_table(DOC, Some("Key topics"));
        let topics: Vec<&str> = entries.iter().map(|e| e.topic()).collect();
        assert_eq!(topics, vec!["permissions", "sessions", "hooks"]);
        assert_eq!(entries[0].path(), "references/permissions.md");
        assert_eq!(entries[0].description(), "Approving tool use");
        assert_eq!(entries[1].path(), "references/sessions.md");
    }

    #[test]
    fn section_title_ignores_case_and_trailing_colon() {
        let doc = "## KEY TOPICS:\n\n| a | b | c |\n|---|---|---|\n| mcp | MCP | references/mcp.md |\n";
        let entries = parse_topic_table(doc, Some("key topics"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].topic(), "mcp");
    }

    #[test]
    fn no_section_reads_every_table() {
        let entries = parse_topic_table(DOC, None);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].topic(), "overview");
        assert_eq!(entries[4].topic(), "install");
    }

    #[test]
    fn header_names_reorder_columns() {
        let doc = "| Reference | Topic | Summary |\n|---|---|---|\n| references/mcp.md | mcp | MCP servers |\n";
        let entries = parse_topic_table(doc, None);
        assert_eq!(entries, vec![TopicEntry::new("mcp", "MCP servers", "references/mcp.md")]);
    }

    #[test]
    fn unknown_description_header_keeps_named_columns() {
        let doc = "| Path | Topic | Notes |\n|---|---|---|\n| references/mcp.md | MCP | MCP servers |\n";
        let entries = parse_topic_table(doc, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].topic(), "MCP");
        assert_eq!(entries[0].path(), "references/mcp.md");
        assert_eq!(entries[0].description(), "MCP servers");
    }

    #[test]
    fn unknown_path_header_falls_back_to_positions() {
        let doc = "| Topic | Notes | Where |\n|---|---|---|\n| mcp | MCP servers | references/mcp.md |\n";
        let entries = parse_topic_table(doc, None);
        assert_eq!(entries[0].topic(), "mcp");
        assert_eq!(entries[0].path(), "references/mcp.md");
    }

    #[test]
    fn tables_inside_code_fences_are_ignored() {
        let doc = "```\n| mcp | MCP | references/mcp.md |\n|---|---|---|\n| x | y | z |\n```\n";
        assert!(parse_topic_table(doc, None).is_empty());
    }

    #[test]
    fn missing_section_yields_nothing() {
        assert!(parse_topic_table(DOC, Some("Changelog")).is_empty());
    }

    #[test]
    fn heading_requires_space() {
        assert_eq!(heading("## Key topics"), Some((2, "Key topics")));
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("plain"), None);
    }
}
