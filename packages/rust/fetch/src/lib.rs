//! Page fetching for ClipScout.
//!
//! The extraction pipeline only ever sees raw page content. Where that content
//! comes from is behind [`PageSource`]: [`HttpFetcher`] downloads it with a
//! browser-like header set, and a DOM snapshot saved from a headless browser
//! can be fed in directly by the caller instead.

use std::future::Future;

use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument};
use url::Url;

use clipscout_shared::{ClipScoutError, FetchOptions, Result};

/// Anything that can turn a URL into raw page content.
///
/// Failures are a single error condition; partial content is never returned.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// Static page fetcher over `reqwest`. One attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given timeout, redirect limit, and headers.
    pub fn new(opts: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(opts.user_agent.as_str())
            .default_headers(browser_headers(&opts.referer))
            .redirect(reqwest::redirect::Policy::limited(opts.max_redirects))
            .timeout(opts.timeout)
            .build()
            .map_err(|e| ClipScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ClipScoutError::validation(format!(
                    "unsupported URL scheme '{other}': {url}"
                )));
            }
        }

        debug!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ClipScoutError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClipScoutError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClipScoutError::Network(format!("{url}: body read failed: {e}")))?;

        info!(status = status.as_u16(), bytes = body.len(), "page fetched");
        Ok(body)
    }
}

/// Header set a desktop browser sends for a top-level navigation.
fn browser_headers(referer: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    if let Ok(value) = HeaderValue::from_str(referer) {
        headers.insert(header::REFERER, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchOptions::default()).unwrap()
    }

    #[test]
    fn browser_headers_include_referer() {
        let headers = browser_headers("https://artlist.io/");
        assert_eq!(headers.get(header::REFERER).unwrap(), "https://artlist.io/");
        assert!(headers.contains_key(header::ACCEPT_LANGUAGE));
        assert!(headers.contains_key("sec-fetch-mode"));
    }

    #[test]
    fn invalid_referer_is_skipped() {
        let headers = browser_headers("bad\nvalue");
        assert!(!headers.contains_key(header::REFERER));
    }

    #[tokio::test]
    async fn fetch_returns_body() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/stock-footage/search"))
            .and(wiremock::matchers::header("referer", "https://artlist.io/"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<html><body>ok</body></html>"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/stock-footage/search", server.uri())).unwrap();
        let body = fetcher().fetch(&url).await.unwrap();
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn non_success_status_is_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, ClipScoutError::Network(_)));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let opts = FetchOptions {
            timeout: Duration::from_millis(200),
            ..FetchOptions::default()
        };
        let url = Url::parse(&server.uri()).unwrap();
        let err = HttpFetcher::new(&opts).unwrap().fetch(&url).await.unwrap_err();
        assert!(matches!(err, ClipScoutError::Network(_)));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let url = Url::parse("file:///etc/hosts").unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, ClipScoutError::Validation { .. }));
    }
}
