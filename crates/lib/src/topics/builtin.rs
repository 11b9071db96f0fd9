//! Built-in key topics, used when neither the config nor SKILL.md provides a table.

use super::TopicEntry;

const KEY_TOPICS: &[(&str, &str, &str)] = &[
    (
        "permissions",
        "Permission modes, allow/deny rules, and tool approval callbacks",
        "references/permissions.md",
    ),
    (
        "hooks",
        "Intercept tool calls and session events with hook callbacks",
        "references/hooks.md",
    ),
    (
        "streaming",
        "Streaming input versus single message mode",
        "references/streaming-vs-single-mode.md",
    ),
    (
        "sessions",
        "Resume, fork, and persist conversation sessions",
        "references/sessions.md",
    ),
    (
        "structured-outputs",
        "Schema-validated JSON results",
        "references/structured-outputs.md",
    ),
    (
        "mcp",
        "Connect MCP servers over stdio, HTTP, or SSE",
        "references/mcp.md",
    ),
    (
        "custom-tools",
        "Define in-process tools for the agent",
        "references/custom-tools.md",
    ),
    (
        "subagents",
        "Delegate work to specialized subagents",
        "references/subagents.md",
    ),
    (
        "slash-commands",
        "Built-in and custom slash commands",
        "references/slash-commands.md",
    ),
];

/// The nine key topics from the skill's navigation guide, in guide order.
pub fn key_topics() -> Vec<TopicEntry> {
    KEY_TOPICS
        .iter()
        .map(|(topic, description, path)| TopicEntry::new(*topic, *description, *path))
        .collect()
}
