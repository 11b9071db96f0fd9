use clap::{Parser, Subcommand};
use skillref::config::{self, Config};
use skillref::skill::{self, SyncReport};
use skillref::topics::{self, TopicEntry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skillref")]
#[command(about = "Look up skill topics, check references, and refresh the docs mirror", long_about = None)]
struct Cli {
    /// Log at info level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the skill directory with a default config, SKILL.md, and references directory. Existing files are kept.
    Init {
        /// Config file path (default: SKILLREF_CONFIG_PATH or ./skillref.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// List every topic in declaration order.
    Topics {
        /// Config file path (default: SKILLREF_CONFIG_PATH or ./skillref.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print the reference document for a topic (case-insensitive).
    Lookup {
        /// Topic name, e.g. "sessions"
        topic: String,

        /// Match every topic starting with TOPIC instead of an exact name.
        #[arg(long)]
        prefix: bool,

        /// Config file path (default: SKILLREF_CONFIG_PATH or ./skillref.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Check that every topic's document exists and that SKILL.md matches the references directory.
    Check {
        /// Config file path (default: SKILLREF_CONFIG_PATH or ./skillref.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Fetch the upstream docs into the references directory and update the manifest.
    Fetch {
        /// Config file path (default: SKILLREF_CONFIG_PATH or ./skillref.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Append newly fetched, unreferenced documents to SKILL.md.
        #[arg(long)]
        update_skill: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("skillref {}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        Some(Commands::Init { config }) => run_init(config).map(|_| true),
        Some(Commands::Topics { config }) => run_topics(config).map(|_| true),
        Some(Commands::Lookup {
            topic,
            prefix,
            config,
        }) => run_lookup(config, &topic, prefix),
        Some(Commands::Check { config }) => run_check(config),
        Some(Commands::Fetch {
            config,
            update_skill,
        }) => run_fetch(config, update_skill).await.map(|_| true),
        None => {
            println!("Run with --help for usage");
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// Config plus the resolved skill directory.
fn open_skill(config_path: Option<PathBuf>) -> anyhow::Result<(Config, PathBuf)> {
    let (config, path) = config::load_config(config_path)?;
    let skill_dir = config::resolve_skill_dir(&config, &path);
    Ok((config, skill_dir))
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(config::default_config_path);
    let skill_dir = skillref::init::init_skill_dir(&path)?;
    println!("initialized skill directory at {}", skill_dir.display());
    Ok(())
}

fn load_index(config: &Config, skill_dir: &std::path::Path) -> anyhow::Result<topics::TopicIndex> {
    let (index, source) = topics::load_topic_index(config, skill_dir)?;
    log::info!("loaded {} topics from {}", index.len(), source);
    Ok(index)
}

fn print_entry(entry: &TopicEntry) {
    println!("{:<20} {:<45} {}", entry.topic(), entry.path(), entry.description());
}

fn run_topics(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, skill_dir) = open_skill(config_path)?;
    let index = load_index(&config, &skill_dir)?;
    for entry in index.list() {
        print_entry(entry);
    }
    Ok(())
}

fn run_lookup(config_path: Option<PathBuf>, topic: &str, prefix: bool) -> anyhow::Result<bool> {
    let (config, skill_dir) = open_skill(config_path)?;
    let index = load_index(&config, &skill_dir)?;

    let hits: Vec<&TopicEntry> = if prefix {
        index.lookup_prefix(topic)
    } else {
        index.lookup(topic).into_iter().collect()
    };
    if hits.is_empty() {
        eprintln!("no topic matches \"{}\"", topic);
        return Ok(false);
    }
    for entry in hits {
        print_entry(entry);
    }
    Ok(true)
}

fn print_sync(report: &SyncReport) {
    if !report.orphaned.is_empty() {
        println!("orphaned references in SKILL.md (files don't exist):");
        for f in &report.orphaned {
            println!("  - {}", f);
        }
    }
    if !report.unreferenced.is_empty() {
        println!("unreferenced files (not in SKILL.md):");
        for f in &report.unreferenced {
            println!("  - {}", f);
        }
    }
    if report.is_in_sync() {
        println!("SKILL.md is in sync with the references directory");
    }
    if !report.custom.is_empty() {
        println!("custom/local docs preserved (not fetched):");
        for f in &report.custom {
            println!("  - {}", f);
        }
    }
}

fn run_check(config_path: Option<PathBuf>) -> anyhow::Result<bool> {
    let (config, skill_dir) = open_skill(config_path)?;
    skillref::init::require_initialized(&skill_dir)?;
    let references = config::resolve_references_dir(&config, &skill_dir);

    let index = load_index(&config, &skill_dir)?;
    let unresolved = index.validate(&skill_dir);
    if unresolved.is_empty() {
        println!("all {} topic documents resolve", index.len());
    } else {
        println!("unresolved topic documents:");
        for e in &unresolved {
            println!("  - {}", e);
        }
    }

    let report = skill::sync_report(&skill_dir, &references, &config.custom_files)?;
    print_sync(&report);

    Ok(unresolved.is_empty() && report.orphaned.is_empty())
}

async fn run_fetch(config_path: Option<PathBuf>, update_skill: bool) -> anyhow::Result<()> {
    let (config, skill_dir) = open_skill(config_path)?;
    skillref::init::require_initialized(&skill_dir)?;
    let references = config::resolve_references_dir(&config, &skill_dir);

    let summary = skillref::fetch::fetch_docs(&config, &references).await?;
    println!(
        "fetch completed: {} successful, {} failed",
        summary.successful, summary.failed
    );
    for page in &summary.failed_pages {
        println!("  failed: {}", page);
    }
    for file in &summary.removed_files {
        println!("  removed: {}", file);
    }

    let skill_file = skill::SkillFile::load(&skill_dir)?;
    let mut present = summary.fetched_files.clone();
    present.insert(skillref::manifest::MANIFEST_FILE.to_string());
    let report = skill::check_sync(&skill_file.references(), &present, &config.custom_files);
    print_sync(&report);
    if update_skill {
        skill::append_uncategorized(&skill_dir, &report.unreferenced)?;
    }

    Ok(())
}
