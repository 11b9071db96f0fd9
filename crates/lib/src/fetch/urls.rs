//! Doc URL helpers: markdown URL form and local file names.

/// Path fragments that identify Agent SDK pages, most specific first.
pub const AGENT_SDK_PATH_MARKERS: &[&str] = &["/docs/en/agent-sdk/", "/en/docs/agent-sdk/", "/agent-sdk/"];

/// True when the URL points at an Agent SDK page.
pub fn is_agent_sdk_url(url: &str) -> bool {
    AGENT_SDK_PATH_MARKERS.iter().any(|m| url.contains(m))
}

/// Split a doc URL into (page URL, markdown URL).
pub fn normalize_doc_url(url: &str) -> (String, String) {
    let url = url.trim();
    let url = url.strip_suffix('/').unwrap_or(url);
    if let Some(original) = url.strip_suffix(".md") {
        (original.to_string(), url.to_string())
    } else if let Some(original) = url.strip_suffix(".html") {
        (original.to_string(), format!("{}.md", original))
    } else {
        (url.to_string(), format!("{}.md", url))
    }
}

/// Local file name for a doc URL or path: the slug after the Agent SDK marker
/// (or the last path segment), with `/` replaced by `__`, plus `.md`.
pub fn url_to_safe_filename(url_or_path: &str) -> String {
    let path = if url_or_path.contains("//") {
        reqwest::Url::parse(url_or_path)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url_or_path.to_string())
    } else {
        url_or_path.to_string()
    };
    let path = path.trim_end_matches('/');
    let path = path
        .strip_suffix(".md")
        .or_else(|| path.strip_suffix(".html"))
        .unwrap_or(path);

    let slug = AGENT_SDK_PATH_MARKERS
        .iter()
        .find_map(|m| path.split_once(m).map(|(_, rest)| rest))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| path.trim_matches('/').rsplit('/').next().unwrap_or(""));
    let slug = slug.trim_matches('/');
    let slug = if slug.is_empty() { "index" } else { slug };

    let safe = slug.replace('/', "__");
    if safe.ends_with(".md") {
        safe
    } else {
        format!("{}.md", safe)
    }
}
