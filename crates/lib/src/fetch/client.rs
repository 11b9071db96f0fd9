//! HTTP client for documentation pages: no-cache headers, retry with jittered backoff,
//! and Retry-After handling for rate limits.

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, EXPIRES, PRAGMA, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

use super::mdx::{clean_mdx_content, validate_markdown_content};
use super::urls::{normalize_doc_url, url_to_safe_filename};
use super::FetchError;
use crate::config::FetchConfig;

const USER_AGENT: &str = concat!("skillref-docs-fetcher/", env!("CARGO_PKG_VERSION"));
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// A fetched, cleaned, validated page.
#[derive(Debug, Clone)]
pub struct FetchedDoc {
    /// Local file name under the references directory.
    pub filename: String,
    pub content: String,
    /// Page URL without the `.md` suffix.
    pub original_url: String,
}

#[derive(Debug, Clone)]
struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    max_rate_limit_wait: Duration,
}

impl RetryPolicy {
    /// `min(base * 2^attempt, max)` scaled by a random factor in [0.5, 1.0].
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        delay.mul_f64(jitter_factor())
    }
}

fn jitter_factor() -> f64 {
    let mut bytes = [0u8; 2];
    if getrandom::getrandom(&mut bytes).is_err() {
        return 1.0;
    }
    0.5 + f64::from(u16::from_le_bytes(bytes)) / f64::from(u16::MAX) * 0.5
}

/// Client for documentation hosts.
#[derive(Clone)]
pub struct DocsClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl DocsClient {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(EXPIRES, HeaderValue::from_static("0"));
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            retry: RetryPolicy {
                max_retries: config.max_retries.max(1),
                base_delay: Duration::from_secs(config.retry_delay_secs),
                max_delay: Duration::from_secs(config.max_retry_delay_secs),
                max_rate_limit_wait: Duration::from_secs(config.max_rate_limit_wait_secs),
            },
        })
    }

    /// GET a text resource; non-success status is an error.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let res = self.client.get(url).send().await?.error_for_status()?;
        Ok(res.text().await?)
    }

    /// GET a text resource; `None` for a non-200 status.
    pub async fn get_text_if_ok(&self, url: &str) -> Result<Option<String>, FetchError> {
        let res = self.client.get(url).send().await?;
        if res.status() != StatusCode::OK {
            log::debug!("{} returned {}", url, res.status());
            return Ok(None);
        }
        Ok(Some(res.text().await?))
    }

    /// Fetch a doc page as markdown, clean MDX components out of it, and validate it.
    /// Transport and status failures are retried; content validation failures are not.
    pub async fn fetch_markdown(&self, doc_url: &str) -> Result<FetchedDoc, FetchError> {
        let (original_url, markdown_url) = normalize_doc_url(doc_url);
        let filename = url_to_safe_filename(&original_url);
        log::info!("fetching {} -> {}", markdown_url, filename);

        let attempts = self.retry.max_retries;
        let mut last_error = String::new();
        for attempt in 0..attempts {
            match self.client.get(&markdown_url).send().await {
                Ok(res) if res.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let wait = retry_after(res.headers())
                        .unwrap_or(DEFAULT_RETRY_AFTER)
                        .min(self.retry.max_rate_limit_wait);
                    log::warn!("rate limited, waiting {} seconds", wait.as_secs());
                    tokio::time::sleep(wait).await;
                    last_error = "rate limited".to_string();
                    continue;
                }
                Ok(res) if !res.status().is_success() => {
                    last_error = format!("{} returned {}", markdown_url, res.status());
                }
                Ok(res) => match res.text().await {
                    Ok(raw) => {
                        let content = clean_mdx_content(&raw);
                        if content.len() < raw.len() {
                            log::info!("cleaned MDX content: {} -> {} bytes", raw.len(), content.len());
                        }
                        validate_markdown_content(&content).map_err(|source| {
                            log::error!("content validation failed for {}: {}", filename, source);
                            FetchError::Content {
                                filename: filename.clone(),
                                source,
                            }
                        })?;
                        log::info!("fetched {} ({} bytes)", filename, content.len());
                        return Ok(FetchedDoc {
                            filename,
                            content,
                            original_url,
                        });
                    }
                    Err(e) => last_error = e.to_string(),
                },
                Err(e) => last_error = e.to_string(),
            }

            log::warn!(
                "attempt {}/{} failed for {}: {}",
                attempt + 1,
                attempts,
                filename,
                last_error
            );
            if attempt + 1 < attempts {
                tokio::time::sleep(self.retry.backoff(attempt)).await;
            }
        }

        Err(FetchError::Exhausted {
            filename,
            attempts,
            last_error,
        })
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            max_rate_limit_wait: Duration::from_secs(120),
        }
    }

    #[test]
    fn backoff_doubles_within_jitter() {
        let p = policy();
        for (attempt, full) in [(0, 2.0), (1, 4.0), (2, 8.0), (3, 16.0)] {
            let d = p.backoff(attempt).as_secs_f64();
            assert!(d >= full * 0.5 - 1e-9 && d <= full + 1e-9, "attempt {}: {}", attempt, d);
        }
    }

    #[test]
    fn backoff_is_capped() {
        let p = policy();
        assert!(p.backoff(10).as_secs_f64() <= 30.0 + 1e-9);
        assert!(p.backoff(40).as_secs_f64() <= 30.0 + 1e-9);
    }

    #[test]
    fn retry_after_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(7)));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn zero_retries_still_tries_once() {
        let config = FetchConfig {
            max_retries: 0,
            ..FetchConfig::default()
        };
        let client = DocsClient::new(&config).unwrap();
        assert_eq!(client.retry.max_retries, 1);
    }
}
