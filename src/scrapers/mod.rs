//! Shared scraping utilities and the per-pharmacy adapters

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::traits::PageFetcher;

pub mod ahumada;
pub mod cruz_verde;
pub mod dr_simi;
pub mod salcobrand;

pub use ahumada::AhumadaAdapter;
pub use cruz_verde::CruzVerdeAdapter;
pub use dr_simi::DrSimiAdapter;
pub use salcobrand::SalcobrandAdapter;

/// Currency marker, optional whitespace, then digits with `.` or `,` grouping
static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*\d[\d.,]*").expect("price pattern is valid"));

/// Scan a raw page body for currency-formatted prices.
///
/// Each match is reduced to its digits; values that overflow or are not
/// positive are discarded. Candidates keep document order.
pub fn price_candidates(html: &str) -> Vec<i64> {
    PRICE_PATTERN
        .find_iter(html)
        .filter_map(|m| {
            let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
            digits.parse::<i64>().ok()
        })
        .filter(|price| *price > 0)
        .collect()
}

/// First candidate strictly greater than `floor`, in document order
pub(crate) fn first_above(candidates: &[i64], floor: i64) -> Option<i64> {
    candidates.iter().copied().find(|price| *price > floor)
}

/// Why a product page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether trying again later could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout => true,
            FetchError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::Request(e) => e.is_connect() || e.is_request() || e.is_body(),
        }
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Request(e)
    }
}

/// Plain HTTP(S) GET with a bounded per-request timeout
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "Fetching product page");

        let response = self.client.get(url).send().await.map_err(classify)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        response.text().await.map_err(classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_strip_grouping_separators() {
        let html = r#"<span class="price">$10,000</span><del>$ 12.990</del>"#;
        assert_eq!(price_candidates(html), vec![10000, 12990]);
    }

    #[test]
    fn candidates_tolerate_whitespace_after_marker() {
        let html = "<p>$ 3,000</p><p>$\n\t4,500</p>";
        assert_eq!(price_candidates(html), vec![3000, 4500]);
    }

    #[test]
    fn candidates_ignore_zero_and_bare_markers() {
        let html = "shipping $0 <b>$</b> total $ , $1.990";
        assert_eq!(price_candidates(html), vec![1990]);
    }

    #[test]
    fn candidates_skip_values_that_overflow() {
        let html = "$99999999999999999999999 $2,500";
        assert_eq!(price_candidates(html), vec![2500]);
    }

    #[test]
    fn page_without_prices_yields_nothing() {
        assert!(price_candidates("<html><body>Sin stock</body></html>").is_empty());
    }

    #[test]
    fn status_errors_classified() {
        assert!(FetchError::Status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(FetchError::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!FetchError::Status(StatusCode::NOT_FOUND).is_transient());
        assert!(FetchError::Timeout.is_transient());
    }

    /// Serve a few canned routes on an ephemeral local port
    async fn spawn_site() -> String {
        use axum::{Router, http::StatusCode as AxumStatus, routing::get};

        let app = Router::new()
            .route("/ok", get(|| async { "<b>$4.990</b>" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "$1.000"
                }),
            )
            .route(
                "/unavailable",
                get(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "try later") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        format!("http://{addr}")
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new("price-sync-test", Duration::from_millis(100)).unwrap()
    }

    #[tokio::test]
    async fn http_fetcher_returns_body() {
        let base = spawn_site().await;
        let html = fetcher().fetch(&format!("{base}/ok")).await.unwrap();
        assert_eq!(price_candidates(&html), vec![4990]);
    }

    #[tokio::test]
    async fn http_fetcher_times_out_slow_pages() {
        let base = spawn_site().await;
        let err = fetcher().fetch(&format!("{base}/slow")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout), "got {err:?}");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn http_fetcher_maps_error_status() {
        let base = spawn_site().await;
        let err = fetcher().fetch(&format!("{base}/unavailable")).await.unwrap_err();
        assert!(
            matches!(err, FetchError::Status(status) if status == StatusCode::SERVICE_UNAVAILABLE),
            "got {err:?}"
        );
        assert!(err.is_transient());
    }
}
