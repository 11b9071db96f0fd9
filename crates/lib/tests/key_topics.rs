//! Integration test: initialize a skill directory, load the key topics from its SKILL.md,
//! and check lookup, ordering, path validation, and reference sync against real files.

use skillref::config::{self, Config};
use skillref::skill;
use skillref::topics::{load_topic_index, TopicSource};
use std::path::PathBuf;

const KEY_TOPICS: [&str; 9] = [
    "permissions",
    "hooks",
    "streaming",
    "sessions",
    "structured-outputs",
    "mcp",
    "custom-tools",
    "subagents",
    "slash-commands",
];

fn temp_skill_dir() -> (PathBuf, Config, PathBuf) {
    let dir = std::env::temp_dir().join(format!("skillref-key-topics-{}", uuid::Uuid::new_v4()));
    let config_path = dir.join("skillref.json");
    let skill_dir = skillref::init::init_skill_dir(&config_path).expect("init skill dir");
    let (config, _) = config::load_config(Some(config_path)).expect("load config");
    (dir, config, skill_dir)
}

fn write_reference(skill_dir: &std::path::Path, path: &str) {
    std::fs::write(skill_dir.join(path), "# Reference\n").expect("write reference");
}

#[test]
fn key_topics_end_to_end() {
    let (dir, config, skill_dir) = temp_skill_dir();

    let (index, source) = load_topic_index(&config, &skill_dir).expect("build index");
    assert_eq!(source, TopicSource::SkillTable);
    assert_eq!(index.len(), 9);
    let topics: Vec<&str> = index.list().iter().map(|e| e.topic()).collect();
    assert_eq!(topics, KEY_TOPICS);
    assert_eq!(index.list(), index.list());

    let sessions = index.lookup("sessions").expect("sessions topic");
    assert_eq!(sessions.path(), "references/sessions.md");
    assert_eq!(index.lookup("SESSIONS"), Some(sessions));
    assert!(index.lookup("plugins").is_none());

    // nothing fetched yet: every path is unresolved, but lookup still works
    assert_eq!(index.validate(&skill_dir).len(), 9);

    for entry in index.list() {
        write_reference(&skill_dir, entry.path());
    }
    assert!(index.validate(&skill_dir).is_empty());

    std::fs::remove_file(skill_dir.join("references/mcp.md")).expect("remove mcp.md");
    let errors = index.validate(&skill_dir);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].topic, "mcp");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn reference_sync_and_uncategorized_update() {
    let (dir, config, skill_dir) = temp_skill_dir();
    let references = config::resolve_references_dir(&config, &skill_dir);

    let (index, _) = load_topic_index(&config, &skill_dir).expect("build index");
    for entry in index.list() {
        write_reference(&skill_dir, entry.path());
    }
    write_reference(&skill_dir, "references/plugins.md");

    let report = skill::sync_report(&skill_dir, &references, &config.custom_files).expect("sync");
    assert!(report.orphaned.is_empty());
    assert_eq!(report.unreferenced, vec!["plugins.md"]);

    skill::append_uncategorized(&skill_dir, &report.unreferenced).expect("append");
    let report = skill::sync_report(&skill_dir, &references, &config.custom_files).expect("sync");
    assert!(report.is_in_sync());

    // the appended list is not part of the key topics table
    let (index, _) = load_topic_index(&config, &skill_dir).expect("rebuild index");
    assert_eq!(index.len(), 9);

    let _ = std::fs::remove_dir_all(&dir);
}
