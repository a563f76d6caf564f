//! HTTP fetcher with retry, backoff, and deadline-aware timeouts
//!
//! All page and robots.txt requests go through this layer. Requests carry the
//! configured User-Agent, follow redirects transparently, use a 5 second
//! connect timeout, and cap each attempt at 10 seconds or the remaining
//! global deadline, whichever is smaller.

use crate::config::CrawlConfig;
use reqwest::{header, redirect::Policy, Client};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

const MAX_ATTEMPTS: u32 = 3;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT_CAP: Duration = Duration::from_secs(10);
const BACKOFF_STEP: Duration = Duration::from_millis(200);

/// Failure after the retry loop gave up
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error for {url} after {attempts} attempts: {source}")]
    Transport {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    #[error("cancelled or deadline exceeded before successful fetch: {url}")]
    Aborted { url: String },
}

/// A completed HTTP exchange
///
/// Non-retryable error statuses are returned as a `Response` too; only
/// transport failures and retry exhaustion surface as `FetchError`.
#[derive(Debug, Clone)]
pub struct Response {
    /// URL the request was issued for
    pub requested_url: Url,
    /// Final URL after redirects
    pub effective_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Response body
    pub body: String,
}

impl Response {
    /// True iff status is 2xx and the Content-Type contains "text/html"
    /// (case-insensitive); gates whether a page proceeds to extraction
    pub fn is_success_html(&self) -> bool {
        (200..300).contains(&self.status)
            && self.content_type.to_lowercase().contains("text/html")
    }
}

/// Issues GET requests under the shared deadline and cancellation flag
pub struct HttpFetcher {
    client: Client,
    deadline: Instant,
    cancelled: Arc<AtomicBool>,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured User-Agent and redirect following
    pub fn new(
        config: &CrawlConfig,
        deadline: Instant,
        cancelled: Arc<AtomicBool>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(Policy::limited(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            deadline,
            cancelled,
        })
    }

    /// Fetches a URL with up to 3 attempts
    ///
    /// An attempt is retried, with a linear backoff of 200ms times the
    /// attempt number, if it fails with a transport error or returns HTTP
    /// 502/503/504. Any other status is returned immediately as a Response.
    /// Cancellation or deadline expiry observed before an attempt sets the
    /// run's cancellation flag and aborts.
    pub async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        let mut attempt = 0;
        let mut last_transport: Option<reqwest::Error> = None;

        while attempt < MAX_ATTEMPTS && !self.cancelled.load(Ordering::SeqCst) {
            attempt += 1;

            let now = Instant::now();
            if now >= self.deadline {
                self.cancelled.store(true, Ordering::SeqCst);
                break;
            }
            let timeout = (self.deadline - now).min(REQUEST_TIMEOUT_CAP);

            match self.client.get(url.clone()).timeout(timeout).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if matches!(status, 502 | 503 | 504) && attempt < MAX_ATTEMPTS {
                        tracing::debug!(
                            "HTTP {} for {} on attempt {}; retrying",
                            status,
                            url,
                            attempt
                        );
                        tokio::time::sleep(BACKOFF_STEP * attempt).await;
                        continue;
                    }
                    if matches!(status, 502 | 503 | 504) {
                        // Retryable status on the final attempt: exhausted.
                        break;
                    }

                    let effective_url = response.url().clone();
                    let content_type = response
                        .headers()
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    match response.text().await {
                        Ok(body) => {
                            return Ok(Response {
                                requested_url: url.clone(),
                                effective_url,
                                status,
                                content_type,
                                body,
                            });
                        }
                        Err(e) => {
                            tracing::warn!(
                                "HTTP attempt {} failed reading body for {}: {}",
                                attempt,
                                url,
                                e
                            );
                            last_transport = Some(e);
                            tokio::time::sleep(BACKOFF_STEP * attempt).await;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("HTTP attempt {} failed for {}: {}", attempt, url, e);
                    last_transport = Some(e);
                    tokio::time::sleep(BACKOFF_STEP * attempt).await;
                }
            }
        }

        match last_transport {
            Some(source) => Err(FetchError::Transport {
                url: url.to_string(),
                attempts: attempt,
                source,
            }),
            None => Err(FetchError::Aborted {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(max_time: Duration) -> HttpFetcher {
        let config = CrawlConfig::new(
            Url::parse("http://127.0.0.1/").unwrap(),
            Duration::from_secs(30),
        );
        HttpFetcher::new(
            &config,
            Instant::now() + max_time,
            Arc::new(AtomicBool::new(false)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_html_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher_for(Duration::from_secs(30));
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.is_success_html());
        assert!(response.body.contains("hi"));
    }

    #[tokio::test]
    async fn test_sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(header("user-agent", "rag-webcrawler/0.1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/html"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(Duration::from_secs(30));
        let url = Url::parse(&format!("{}/ua", server.uri())).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_retries_503_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/html"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(Duration::from_secs(30));
        let url = Url::parse(&format!("{}/flaky", server.uri())).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn test_persistent_503_exhausts_three_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(Duration::from_secs(30));
        let url = Url::parse(&format!("{}/down", server.uri())).unwrap();
        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(FetchError::Aborted { .. })));
    }

    #[tokio::test]
    async fn test_404_returned_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(Duration::from_secs(30));
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success_html());
    }

    #[tokio::test]
    async fn test_follows_redirect_to_effective_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("moved", "text/html"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(Duration::from_secs(30));
        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(response.effective_url.path().ends_with("/new"));
        assert!(response.requested_url.path().ends_with("/old"));
    }

    #[tokio::test]
    async fn test_cancelled_flag_aborts_before_attempt() {
        let config = CrawlConfig::new(
            Url::parse("http://127.0.0.1/").unwrap(),
            Duration::from_secs(30),
        );
        let cancelled = Arc::new(AtomicBool::new(true));
        let fetcher = HttpFetcher::new(
            &config,
            Instant::now() + Duration::from_secs(30),
            cancelled,
        )
        .unwrap();

        let url = Url::parse("http://127.0.0.1:9/never").unwrap();
        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(FetchError::Aborted { .. })));
    }

    #[tokio::test]
    async fn test_expired_deadline_sets_cancelled() {
        let config = CrawlConfig::new(
            Url::parse("http://127.0.0.1/").unwrap(),
            Duration::from_secs(30),
        );
        let cancelled = Arc::new(AtomicBool::new(false));
        // A deadline of "now" is already expired by the time fetch runs.
        let fetcher = HttpFetcher::new(&config, Instant::now(), cancelled.clone()).unwrap();

        let url = Url::parse("http://127.0.0.1:9/never").unwrap();
        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(FetchError::Aborted { .. })));
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn test_is_success_html_requires_html_content_type() {
        let response = Response {
            requested_url: Url::parse("https://ex.com/").unwrap(),
            effective_url: Url::parse("https://ex.com/").unwrap(),
            status: 200,
            content_type: "application/json".to_string(),
            body: String::new(),
        };
        assert!(!response.is_success_html());
    }

    #[test]
    fn test_is_success_html_case_insensitive() {
        let response = Response {
            requested_url: Url::parse("https://ex.com/").unwrap(),
            effective_url: Url::parse("https://ex.com/").unwrap(),
            status: 200,
            content_type: "TEXT/HTML; charset=UTF-8".to_string(),
            body: String::new(),
        };
        assert!(response.is_success_html());
    }
}
