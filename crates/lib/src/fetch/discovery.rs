//! Find Agent SDK doc pages: llms.txt first, then sitemaps, then a built-in page list.

use quick_xml::events::Event;
use std::collections::{BTreeSet, HashSet, VecDeque};

use super::client::DocsClient;
use super::urls::is_agent_sdk_url;
use super::FetchError;

/// Essential pages, used when neither llms.txt nor a sitemap lists any.
pub const FALLBACK_PAGES: &[&str] = &[
    "https://platform.claude.com/docs/en/agent-sdk/overview",
    "https://platform.claude.com/docs/en/agent-sdk/quickstart",
    "https://platform.claude.com/docs/en/agent-sdk/python",
    "https://platform.claude.com/docs/en/agent-sdk/typescript",
    "https://platform.claude.com/docs/en/agent-sdk/permissions",
    "https://platform.claude.com/docs/en/agent-sdk/settings",
    "https://platform.claude.com/docs/en/agent-sdk/sessions",
    "https://platform.claude.com/docs/en/agent-sdk/streaming-vs-single-mode",
    "https://platform.claude.com/docs/en/agent-sdk/structured-outputs",
    "https://platform.claude.com/docs/en/agent-sdk/mcp",
    "https://platform.claude.com/docs/en/agent-sdk/custom-tools",
    "https://platform.claude.com/docs/en/agent-sdk/hooks",
    "https://platform.claude.com/docs/en/agent-sdk/subagents",
    "https://platform.claude.com/docs/en/agent-sdk/skills",
    "https://platform.claude.com/docs/en/agent-sdk/slash-commands",
    "https://platform.claude.com/docs/en/agent-sdk/plugins",
    "https://platform.claude.com/docs/en/agent-sdk/todo-tracking",
    "https://platform.claude.com/docs/en/agent-sdk/cost-tracking",
    "https://platform.claude.com/docs/en/agent-sdk/hosting",
    "https://platform.claude.com/docs/en/agent-sdk/secure-deployment",
    "https://platform.claude.com/docs/en/agent-sdk/modifying-system-prompts",
    "https://platform.claude.com/docs/en/agent-sdk/migration-guide",
];

/// Agent SDK page URLs listed in an llms.txt body. Root-relative entries are joined to `base_url`.
pub fn parse_llms_txt(text: &str, base_url: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for line in text.lines() {
        let mut line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('-') {
            line = line.trim_start_matches('-').trim();
        }
        let url = if line.starts_with('/') {
            format!("{}{}", base_url.trim_end_matches('/'), line)
        } else {
            line.to_string()
        };
        if url.starts_with("http") && is_agent_sdk_url(&url) {
            urls.push(url);
        }
    }
    urls
}

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    /// `<sitemapindex>`: locations of further sitemaps.
    Index(Vec<String>),
    /// `<urlset>`: page locations.
    UrlSet(Vec<String>),
}

/// Parse a sitemap or sitemap index. `<loc>` is matched by local name, so namespaced
/// and un-namespaced documents both work.
pub fn parse_sitemap(xml: &str) -> Result<Sitemap, FetchError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut is_index: Option<bool> = None;
    let mut in_loc = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let local = e.local_name();
                let name = local.as_ref();
                if is_index.is_none() {
                    is_index = Some(name.eq_ignore_ascii_case(b"sitemapindex"));
                }
                if name == b"loc" {
                    in_loc = true;
                }
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Ok(Event::Text(ref t)) if in_loc => {
                let text = t
                    .unescape()
                    .map_err(|e| FetchError::Sitemap(e.to_string()))?;
                push_loc(&mut locs, &text);
            }
            Ok(Event::CData(ref t)) if in_loc => {
                push_loc(&mut locs, &String::from_utf8_lossy(t));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::Sitemap(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(if is_index == Some(true) {
        Sitemap::Index(locs)
    } else {
        Sitemap::UrlSet(locs)
    })
}

fn push_loc(locs: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        locs.push(text.to_string());
    }
}

/// Walks the configured sources in order and returns the first non-empty page list.
pub struct Discoverer<'a> {
    client: &'a DocsClient,
    llms_urls: Vec<String>,
    sitemap_urls: Vec<String>,
}

impl<'a> Discoverer<'a> {
    pub fn new(client: &'a DocsClient, llms_urls: Vec<String>, sitemap_urls: Vec<String>) -> Self {
        Self {
            client,
            llms_urls,
            sitemap_urls,
        }
    }

    /// Sorted, de-duplicated page URLs. Never empty: falls back to [`FALLBACK_PAGES`].
    pub async fn discover(&self) -> Vec<String> {
        let urls = self.from_llms().await;
        if !urls.is_empty() {
            return urls;
        }
        let urls = self.from_sitemaps().await;
        if !urls.is_empty() {
            return urls;
        }
        log::warn!("falling back to static Agent SDK page list");
        FALLBACK_PAGES.iter().map(|s| s.to_string()).collect()
    }

    async fn from_llms(&self) -> Vec<String> {
        for llms_url in &self.llms_urls {
            log::info!("trying llms.txt: {}", llms_url);
            let body = match self.client.get_text_if_ok(llms_url).await {
                Ok(Some(body)) => body,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("failed to fetch {}: {}", llms_url, e);
                    continue;
                }
            };
            let urls = parse_llms_txt(&body, &origin(llms_url));
            if !urls.is_empty() {
                let urls = sorted_unique(urls);
                log::info!("discovered {} Agent SDK pages from llms.txt", urls.len());
                return urls;
            }
        }
        Vec::new()
    }

    async fn from_sitemaps(&self) -> Vec<String> {
        for sitemap_url in &self.sitemap_urls {
            log::info!("trying sitemap: {}", sitemap_url);
            match self.sitemap_locations(sitemap_url).await {
                Ok(urls) => {
                    let urls: Vec<String> = urls.into_iter().filter(|u| is_agent_sdk_url(u)).collect();
                    if !urls.is_empty() {
                        let urls = sorted_unique(urls);
                        log::info!("discovered {} Agent SDK pages from sitemap", urls.len());
                        return urls;
                    }
                }
                Err(e) => log::warn!("failed to fetch {}: {}", sitemap_url, e),
            }
        }
        Vec::new()
    }

    /// All page locations reachable from `root`, following nested sitemap indexes once each.
    async fn sitemap_locations(&self, root: &str) -> Result<Vec<String>, FetchError> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root.to_string()]);
        let mut pages = Vec::new();
        while let Some(url) = queue.pop_front() {
            if !seen.insert(url.clone()) {
                continue;
            }
            let body = self.client.get_text(&url).await?;
            match parse_sitemap(&body)? {
                Sitemap::Index(children) => queue.extend(children),
                Sitemap::UrlSet(locs) => pages.extend(locs),
            }
        }
        Ok(pages)
    }
}

/// `scheme://host[:port]` of a URL.
fn origin(url: &str) -> String {
    reqwest::Url::parse(url)
        .map(|u| u.origin().ascii_serialization())
        .unwrap_or_default()
}

fn sorted_unique(urls: Vec<String>) -> Vec<String> {
    urls.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}
