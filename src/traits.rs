//! Traits and interfaces for pharmacy-agnostic price scraping

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{PharmacyLink, PriceObservation};
use crate::scrapers::{FetchError, price_candidates};

/// Configuration for a pharmacy site adapter
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Display name for the pharmacy
    pub name: &'static str,
    /// Lowercase fragments matched against the pharmacy name and the URL host
    pub tokens: &'static [&'static str],
}

/// Trait for pharmacy-specific price extraction
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Get the configuration for this adapter
    fn config(&self) -> &AdapterConfig;

    /// Pick the regular and sale price out of the candidates found on a page
    ///
    /// # Arguments
    /// * `candidates` - Positive prices in document order
    fn select_prices(&self, candidates: &[i64]) -> PriceObservation;

    /// Extract a price observation from a raw product page body
    ///
    /// Malformed markup never fails; it just yields fewer candidates.
    fn extract(&self, html: &str) -> PriceObservation {
        self.select_prices(&price_candidates(html))
    }

    /// Fetch the product page and extract its prices
    ///
    /// Sources that need a different request than a plain GET of the
    /// product URL override this; the batch runner only calls this method.
    async fn fetch_and_extract(
        &self,
        fetcher: &dyn PageFetcher,
        url: &str,
    ) -> Result<PriceObservation, FetchError> {
        let html = fetcher.fetch(url).await?;
        Ok(self.extract(&html))
    }
}

/// Fetches the raw body of a product page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Storage boundary for pharmacy links
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// All links with `is_active` set, in storage order
    async fn active_links(&self) -> Result<Vec<PharmacyLink>>;

    /// Overwrite the regular and sale price of one link
    async fn update_prices(
        &self,
        id: &str,
        regular_price: Option<i64>,
        sale_price: Option<i64>,
    ) -> Result<()>;
}
