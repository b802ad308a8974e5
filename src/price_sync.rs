use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dispatcher::AdapterDispatcher;
use crate::models::{BatchResult, FailureReason, LinkOutcome, PharmacyLink, PriceObservation};
use crate::reconciler::reconcile;
use crate::scrapers::FetchError;
use crate::traits::{LinkStore, PageFetcher, SiteAdapter};

/// Job-level failures; everything link-level is counted instead
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a price update is already running")]
    AlreadyRunning,
    #[error("failed to load active pharmacy links: {0:#}")]
    LinkSource(anyhow::Error),
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = match self {
            SyncError::AlreadyRunning => StatusCode::CONFLICT,
            SyncError::LinkSource(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// How often a transient fetch failure is retried
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Multiplied by the attempt number before each retry
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Wait before retry number `attempt` (1-based), saturating on overflow
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Runs one sequential pass over all active pharmacy links
#[derive(Clone)]
pub struct PriceSync {
    store: Arc<dyn LinkStore>,
    fetcher: Arc<dyn PageFetcher>,
    dispatcher: Arc<AdapterDispatcher>,
    request_delay: Duration,
    retry: RetryPolicy,
    running: Arc<Mutex<()>>,
}

impl PriceSync {
    pub fn new(
        store: Arc<dyn LinkStore>,
        fetcher: Arc<dyn PageFetcher>,
        dispatcher: AdapterDispatcher,
    ) -> Self {
        Self {
            store,
            fetcher,
            dispatcher: Arc::new(dispatcher),
            request_delay: Duration::from_secs(1),
            retry: RetryPolicy::none(),
            running: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn LinkStore>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self::new(store, fetcher, AdapterDispatcher::with_default_adapters())
            .with_request_delay(config.request_delay)
            .with_retry(RetryPolicy {
                max_retries: config.max_retries,
                backoff: config.retry_backoff,
            })
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn dispatcher(&self) -> &AdapterDispatcher {
        &self.dispatcher
    }

    pub async fn run(&self) -> Result<BatchResult, SyncError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| SyncError::AlreadyRunning)?;

        let links = self
            .store
            .active_links()
            .await
            .map_err(SyncError::LinkSource)?;

        info!("Refreshing prices for {} active links", links.len());

        let mut result = BatchResult::default();

        for (index, link) in links.iter().enumerate() {
            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            // A panic anywhere in one link's pipeline only fails that link
            let outcome = AssertUnwindSafe(self.process_link(link))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    LinkOutcome::Failed(FailureReason::Panicked(panic_message(panic.as_ref())))
                });

            if let LinkOutcome::Failed(reason) = &outcome {
                warn!(
                    link_id = %link.id,
                    pharmacy = %link.pharmacy_name,
                    medication = %link.medication_name,
                    url = %link.product_url,
                    reason = ?reason,
                    "Could not refresh link"
                );
            }

            result.record(&outcome);
        }

        info!(
            total = result.total,
            updated = result.updated,
            failed = result.failed,
            unchanged = result.unchanged,
            "Price update finished"
        );

        Ok(result)
    }

    async fn process_link(&self, link: &PharmacyLink) -> LinkOutcome {
        let observation = self.observe(link).await;
        reconcile(self.store.as_ref(), link, observation).await
    }

    /// Dispatch, fetch and extract; every failure collapses to an absent observation
    pub async fn observe(&self, link: &PharmacyLink) -> PriceObservation {
        let Some(adapter) = self
            .dispatcher
            .route(&link.pharmacy_name, &link.product_url)
        else {
            warn!(
                pharmacy = %link.pharmacy_name,
                url = %link.product_url,
                "No adapter for pharmacy"
            );
            return PriceObservation::absent();
        };

        match self.observe_with_retry(adapter, &link.product_url).await {
            Ok(observation) => {
                debug!(
                    adapter = adapter.config().name,
                    url = %link.product_url,
                    regular = ?observation.regular_price(),
                    sale = ?observation.sale_price(),
                    "Extracted prices"
                );
                observation
            }
            Err(e) => {
                warn!(
                    adapter = adapter.config().name,
                    url = %link.product_url,
                    error = %e,
                    "Failed to fetch product page"
                );
                PriceObservation::absent()
            }
        }
    }

    async fn observe_with_retry(
        &self,
        adapter: &dyn SiteAdapter,
        url: &str,
    ) -> Result<PriceObservation, FetchError> {
        let mut attempt = 0;

        loop {
            match adapter.fetch_and_extract(self.fetcher.as_ref(), url).await {
                Ok(observation) => return Ok(observation),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let wait = self.retry.delay_for(attempt);
                    debug!(url, attempt, error = %e, "Retrying product page in {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly() {
        let retry = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(500));
        assert_eq!(retry.delay_for(3), Duration::from_millis(1500));
    }

    #[test]
    fn huge_backoff_saturates_instead_of_panicking() {
        let retry = RetryPolicy {
            max_retries: u32::MAX,
            backoff: Duration::from_millis(u64::MAX),
        };
        assert_eq!(retry.delay_for(u32::MAX), Duration::MAX);
    }
}
