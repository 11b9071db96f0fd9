//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (`./skillref.json` by default; its parent is the skill directory) and environment.
//! Every field has a default, so a missing file behaves like `{}`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::topics::TopicEntry;

/// Default llms.txt locations, tried in order.
pub const DEFAULT_LLMS_URLS: &[&str] = &[
    "https://platform.claude.com/docs/llms.txt",
    "https://code.claude.com/docs/llms.txt",
    "https://docs.anthropic.com/docs/llms.txt",
    "https://docs.anthropic.com/llms.txt",
];

/// Default sitemap locations, tried in order when no llms.txt yields pages.
pub const DEFAULT_SITEMAP_URLS: &[&str] = &[
    "https://platform.claude.com/docs/sitemap.xml",
    "https://code.claude.com/docs/sitemap.xml",
    "https://docs.anthropic.com/sitemap.xml",
];

/// Env var that puts an extra llms.txt URL ahead of the configured ones.
pub const LLMS_URL_ENV: &str = "AGENT_SDK_DOCS_LLMS_URL";
/// Env var that puts an extra sitemap URL ahead of the configured ones.
pub const SITEMAP_URL_ENV: &str = "AGENT_SDK_DOCS_SITEMAP_URL";

/// Top-level config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Skill directory (holds SKILL.md). Relative paths are resolved against the config file's parent; default is that parent.
    #[serde(default)]
    pub skill_dir: Option<PathBuf>,

    /// Reference documents directory, relative to the skill directory (default "references").
    #[serde(default = "default_references_dir")]
    pub references_dir: PathBuf,

    /// Heading of the SKILL.md section whose table lists the topics (default "Key topics").
    #[serde(default = "default_topics_section")]
    pub topics_section: String,

    /// Explicit topic list. When non-empty it replaces the SKILL.md table.
    #[serde(default)]
    pub topics: Option<Vec<TopicEntry>>,

    /// Locally maintained reference files: never fetched, never removed.
    #[serde(default = "default_custom_files")]
    pub custom_files: Vec<String>,

    /// Documentation fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Where and how to fetch upstream documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    /// llms.txt URLs, tried in order. AGENT_SDK_DOCS_LLMS_URL is tried first when set.
    #[serde(default = "default_llms_urls")]
    pub llms_urls: Vec<String>,

    /// Sitemap URLs, tried in order. AGENT_SDK_DOCS_SITEMAP_URL is tried first when set.
    #[serde(default = "default_sitemap_urls")]
    pub sitemap_urls: Vec<String>,

    /// Attempts per page (default 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in seconds; doubles each attempt (default 2).
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Upper bound for the backoff delay in seconds (default 30).
    #[serde(default = "default_max_retry_delay_secs")]
    pub max_retry_delay_secs: u64,

    /// Per-request timeout in seconds (default 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Longest Retry-After wait honoured on HTTP 429, in seconds (default 120).
    #[serde(default = "default_max_rate_limit_wait_secs")]
    pub max_rate_limit_wait_secs: u64,
}

fn default_references_dir() -> PathBuf {
    PathBuf::from("references")
}

fn default_topics_section() -> String {
    "Key topics".to_string()
}

fn default_custom_files() -> Vec<String> {
    vec!["openrouter-support.md".to_string()]
}

fn default_llms_urls() -> Vec<String> {
    DEFAULT_LLMS_URLS.iter().map(|s| s.to_string()).collect()
}

fn default_sitemap_urls() -> Vec<String> {
    DEFAULT_SITEMAP_URLS.iter().map(|s| s.to_string()).collect()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_max_retry_delay_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_rate_limit_wait_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skill_dir: None,
            references_dir: default_references_dir(),
            topics_section: default_topics_section(),
            topics: None,
            custom_files: default_custom_files(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            llms_urls: default_llms_urls(),
            sitemap_urls: default_sitemap_urls(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            max_retry_delay_secs: default_max_retry_delay_secs(),
            timeout_secs: default_timeout_secs(),
            max_rate_limit_wait_secs: default_max_rate_limit_wait_secs(),
        }
    }
}

/// Resolve config path from env or default (`skillref.json` in the current directory).
pub fn default_config_path() -> PathBuf {
    std::env::var("SKILLREF_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("skillref.json"))
}

/// Load config from the given path (or the default). Missing file => default config.
/// Returns the config and the path that was used (for resolving the skill directory).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

fn config_parent(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Resolve the skill directory: `config.skillDir` if set (relative paths resolved against the config file's parent), otherwise that parent.
pub fn resolve_skill_dir(config: &Config, config_path: &Path) -> PathBuf {
    let parent = config_parent(config_path);
    match &config.skill_dir {
        Some(d) if !d.as_os_str().is_empty() => {
            let d = expand_home(d);
            if d.is_absolute() {
                d
            } else {
                parent.join(d)
            }
        }
        _ => parent.to_path_buf(),
    }
}

/// Resolve the references directory under the skill directory.
pub fn resolve_references_dir(config: &Config, skill_dir: &Path) -> PathBuf {
    skill_dir.join(expand_home(&config.references_dir))
}

/// llms.txt URLs to try: env AGENT_SDK_DOCS_LLMS_URL first, then config.
pub fn resolve_llms_urls(config: &Config) -> Vec<String> {
    with_override(env_value(LLMS_URL_ENV), &config.fetch.llms_urls)
}

/// Sitemap URLs to try: env AGENT_SDK_DOCS_SITEMAP_URL first, then config.
pub fn resolve_sitemap_urls(config: &Config) -> Vec<String> {
    with_override(env_value(SITEMAP_URL_ENV), &config.fetch.sitemap_urls)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn with_override(first: Option<String>, rest: &[String]) -> Vec<String> {
    let mut urls: Vec<String> = first.into_iter().collect();
    for url in rest {
        let url = url.trim();
        if !url.is_empty() && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.references_dir, PathBuf::from("references"));
        assert_eq!(c.topics_section, "Key topics");
        assert_eq!(c.custom_files, vec!["openrouter-support.md"]);
        assert_eq!(c.fetch.max_retries, 3);
        assert_eq!(c.fetch.llms_urls.len(), 4);
        assert_eq!(c.fetch.sitemap_urls.len(), 3);
    }

    #[test]
    fn empty_json_is_default() {
        let c: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(c.topics_section, "Key topics");
        assert_eq!(c.fetch.retry_delay_secs, 2);
        assert!(c.topics.is_none());
    }

    #[test]
    fn camel_case_fields() {
        let c: Config = serde_json::from_str(
            r#"{
                "skillDir": "skills/sdk",
                "topicsSection": "Topics",
                "customFiles": [],
                "topics": [{"topic": "mcp", "description": "MCP", "path": "references/mcp.md"}],
                "fetch": {"maxRetries": 5, "llmsUrls": ["http://localhost/llms.txt"]}
            }"#,
        )
        .unwrap();
        assert_eq!(c.skill_dir, Some(PathBuf::from("skills/sdk")));
        assert_eq!(c.topics_section, "Topics");
        assert!(c.custom_files.is_empty());
        assert_eq!(c.topics.unwrap()[0].path(), "references/mcp.md");
        assert_eq!(c.fetch.max_retries, 5);
        assert_eq!(c.fetch.llms_urls, vec!["http://localhost/llms.txt"]);
        assert_eq!(c.fetch.sitemap_urls.len(), 3);
    }

    #[test]
    fn resolve_skill_dir_default() {
        let config = Config::default();
        let path = Path::new("/repo/skills/sdk/skillref.json");
        assert_eq!(resolve_skill_dir(&config, path), PathBuf::from("/repo/skills/sdk"));
    }

    #[test]
    fn resolve_skill_dir_bare_file_name() {
        let config = Config::default();
        assert_eq!(
            resolve_skill_dir(&config, Path::new("skillref.json")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn resolve_skill_dir_override_relative() {
        let mut config = Config::default();
        config.skill_dir = Some(PathBuf::from("sdk"));
        let path = Path::new("/repo/skills/skillref.json");
        assert_eq!(resolve_skill_dir(&config, path), PathBuf::from("/repo/skills/sdk"));
    }

    #[test]
    fn resolve_skill_dir_override_absolute() {
        let mut config = Config::default();
        config.skill_dir = Some(PathBuf::from("/opt/skill"));
        let path = Path::new("/repo/skillref.json");
        assert_eq!(resolve_skill_dir(&config, path), PathBuf::from("/opt/skill"));
    }

    #[test]
    fn resolve_skill_dir_expands_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let mut config = Config::default();
        config.skill_dir = Some(PathBuf::from("~/skills/sdk"));
        let path = Path::new("/repo/skillref.json");
        assert_eq!(resolve_skill_dir(&config, path), home.join("skills/sdk"));
    }

    #[test]
    fn references_dir_under_skill_dir() {
        let config = Config::default();
        assert_eq!(
            resolve_references_dir(&config, Path::new("/repo/sdk")),
            PathBuf::from("/repo/sdk/references")
        );
    }

    #[test]
    fn override_goes_first_without_duplicates() {
        let rest = vec!["https://a/llms.txt".to_string(), "https://b/llms.txt".to_string()];
        assert_eq!(
            with_override(Some("https://b/llms.txt".to_string()), &rest),
            vec!["https://b/llms.txt", "https://a/llms.txt"]
        );
        assert_eq!(with_override(None, &rest), rest);
    }
}
