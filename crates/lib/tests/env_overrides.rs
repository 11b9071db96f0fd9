//! Integration test: environment variables that change where config and docs come from.
//! Kept in its own test binary so the variables never leak into the fetch tests.

use skillref::config::{self, Config, DEFAULT_LLMS_URLS, LLMS_URL_ENV, SITEMAP_URL_ENV};
use std::path::PathBuf;

#[test]
fn env_overrides_take_precedence() {
    let config = Config::default();

    std::env::remove_var(LLMS_URL_ENV);
    std::env::remove_var(SITEMAP_URL_ENV);
    assert_eq!(config::resolve_llms_urls(&config), DEFAULT_LLMS_URLS);

    std::env::set_var(LLMS_URL_ENV, " http://mirror.local/llms.txt ");
    std::env::set_var(SITEMAP_URL_ENV, "http://mirror.local/sitemap.xml");
    let llms = config::resolve_llms_urls(&config);
    assert_eq!(llms[0], "http://mirror.local/llms.txt");
    assert_eq!(llms.len(), DEFAULT_LLMS_URLS.len() + 1);
    let sitemaps = config::resolve_sitemap_urls(&config);
    assert_eq!(sitemaps[0], "http://mirror.local/sitemap.xml");
    assert_eq!(&sitemaps[1..], &config.fetch.sitemap_urls[..]);

    // blank values are ignored
    std::env::set_var(LLMS_URL_ENV, "  ");
    assert_eq!(config::resolve_llms_urls(&config), DEFAULT_LLMS_URLS);

    std::env::remove_var(LLMS_URL_ENV);
    std::env::remove_var(SITEMAP_URL_ENV);

    std::env::remove_var("SKILLREF_CONFIG_PATH");
    assert_eq!(config::default_config_path(), PathBuf::from("skillref.json"));
    assert_eq!(
        config::resolve_skill_dir(&Config::default(), &config::default_config_path()),
        PathBuf::from(".")
    );

    std::env::set_var("SKILLREF_CONFIG_PATH", "/srv/skills/sdk/skillref.json");
    assert_eq!(
        config::resolve_skill_dir(&Config::default(), &config::default_config_path()),
        PathBuf::from("/srv/skills/sdk")
    );
    std::env::remove_var("SKILLREF_CONFIG_PATH");
}
