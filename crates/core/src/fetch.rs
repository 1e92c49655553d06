//! Site fetching into a local working tree.
//!
//! The pipeline only talks to the [`SiteFetcher`] trait: given a seed URL and
//! a maximum link depth, an implementation deposits the site's files under a
//! destination directory. [`HttpFetcher`] is the default implementation, a
//! breadth-first crawler that stays below the seed URL.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::Result;

/// HTTP client configuration for fetching a site.
///
/// This struct controls timeout and user agent settings for HTTP requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: "Mozilla/5.0 (ScraperBot)".to_string() }
    }
}

/// Counts reported by a completed crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// HTML pages saved.
    pub pages: usize,
    /// Non-HTML resources saved (images, scripts, stylesheets, ...).
    pub assets: usize,
    /// Linked resources that failed and were left out.
    pub skipped: usize,
}

/// Retrieves a site into a local directory tree.
#[async_trait]
pub trait SiteFetcher: Send + Sync {
    /// Fetches `seed` and every resource reachable from it within `max_depth`
    /// link hops whose URL starts with the seed URL, writing them below `dest`.
    ///
    /// Failing to retrieve the seed itself is an error; failures on linked
    /// resources are skipped.
    async fn fetch_site(&self, seed: &Url, max_depth: usize, dest: &Path) -> Result<FetchStats>;
}

/// Maps a fetched URL to its path below `dest`.
///
/// Directory-like paths get an `index.html`, and HTML pages without an
/// `.html`/`.htm` extension are stored as `<path>/index.html` so a static
/// server can find them again. Query strings and fragments are ignored.
pub fn local_path(dest: &Path, url: &Url, is_html: bool) -> PathBuf {
    let mut path = dest.to_path_buf();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..").collect())
        .unwrap_or_default();

    for segment in &segments {
        path.push(segment);
    }

    let is_directory = url.path().ends_with('/') || segments.is_empty();
    let has_html_extension = segments.last().is_some_and(|last| {
        let lower = last.to_ascii_lowercase();
        lower.ends_with(".html") || lower.ends_with(".htm")
    });

    if is_directory || (is_html && !has_html_extension) {
        path.push("index.html");
    }

    path
}

/// Elements whose `href`/`src` the crawler follows.
const LINK_SELECTOR: &str = "a[href], link[href], img[src], script[src]";

/// Collects the same-site links of an HTML page, resolved against `base`.
///
/// Attribute values come out of the parse tree with character references
/// decoded, so `?a=1&amp;b=2` is requested as `?a=1&b=2`. Only links whose
/// absolute URL starts with `seed` are returned, fragments stripped, in
/// document order.
pub fn collect_links(html: &str, base: &Url, seed: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|el| match el.value().name() {
            "a" | "link" => el.value().attr("href"),
            _ => el.value().attr("src"),
        })
        .filter_map(|link| base.join(link.trim()).ok())
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .filter(|url| url.as_str().starts_with(seed.as_str()))
        .collect()
}

#[cfg(feature = "fetch")]
pub use http::HttpFetcher;

#[cfg(feature = "fetch")]
mod http {
    use std::time::Duration;

    use reqwest::Client;
    use reqwest::header::CONTENT_TYPE;
    use tracing::{debug, info, warn};

    use super::*;
    use crate::SitegraftError;

    /// Breadth-first crawler backed by reqwest.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: Client,
        config: FetchConfig,
    }

    struct Fetched {
        body: Vec<u8>,
        is_html: bool,
    }

    impl HttpFetcher {
        pub fn new(config: FetchConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout))
                .build()
                .map_err(SitegraftError::HttpError)?;
            Ok(Self { client, config })
        }

        async fn get(&self, url: &Url) -> Result<Fetched> {
            let response = self
                .client
                .get(url.clone())
                .header("User-Agent", &self.config.user_agent)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        SitegraftError::Timeout { timeout: self.config.timeout }
                    } else {
                        SitegraftError::HttpError(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(SitegraftError::FetchError { url: url.to_string(), reason: format!("HTTP {}", status) });
            }

            let is_html = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.to_ascii_lowercase().starts_with("text/html"));
            let body = response.bytes().await?.to_vec();

            Ok(Fetched { body, is_html })
        }
    }

    #[async_trait]
    impl SiteFetcher for HttpFetcher {
        async fn fetch_site(&self, seed: &Url, max_depth: usize, dest: &Path) -> Result<FetchStats> {
            if !matches!(seed.scheme(), "http" | "https") {
                return Err(SitegraftError::InvalidUrl(format!("unsupported scheme: {}", seed.scheme())));
            }

            fs::create_dir_all(dest)?;

            let mut stats = FetchStats::default();
            let mut seen: HashSet<String> = HashSet::from([seed.to_string()]);
            let mut queue: VecDeque<(Url, usize)> = VecDeque::from([(seed.clone(), 0)]);

            while let Some((url, depth)) = queue.pop_front() {
                let is_seed = depth == 0;
                let fetched = match self.get(&url).await {
                    Ok(fetched) => fetched,
                    Err(e) if is_seed => return Err(e),
                    Err(e) => {
                        warn!(url = %url, error = %e, "skipping resource");
                        stats.skipped += 1;
                        continue;
                    }
                };

                let target = local_path(dest, &url, fetched.is_html);
                if let Err(e) = save(&target, &fetched.body) {
                    if is_seed {
                        return Err(e);
                    }
                    warn!(url = %url, path = %target.display(), error = %e, "cannot save resource");
                    stats.skipped += 1;
                    continue;
                }
                debug!(url = %url, path = %target.display(), "saved");

                if !fetched.is_html {
                    stats.assets += 1;
                    continue;
                }
                stats.pages += 1;

                if depth < max_depth {
                    let html = String::from_utf8_lossy(&fetched.body);
                    for link in collect_links(&html, &url, seed) {
                        if seen.insert(link.to_string()) {
                            queue.push_back((link, depth + 1));
                        }
                    }
                }
            }

            info!(pages = stats.pages, assets = stats.assets, skipped = stats.skipped, "crawl finished");
            Ok(stats)
        }
    }

    fn save(target: &Path, body: &[u8]) -> Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, body)?;
        Ok(())
    }
}
