//! Data models for pharmacy links, price observations and batch summaries

use serde::{Deserialize, Serialize};

/// One sellable offering of a medication at a pharmacy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacyLink {
    pub id: String,
    pub medication_name: String,
    pub pharmacy_name: String,
    pub product_url: String,
    pub presentation: Option<String>,
    pub commercial_name: Option<String>,
    pub is_active: bool,
    pub regular_price: Option<i64>,
    pub sale_price: Option<i64>,
}

impl PharmacyLink {
    /// Currently stored `(regular, sale)` pair
    pub fn stored_prices(&self) -> (Option<i64>, Option<i64>) {
        (self.regular_price, self.sale_price)
    }
}

/// Prices extracted from a single scrape of a product page.
///
/// A sale price is only kept when it is strictly lower than a present
/// regular price, so every value of this type already satisfies the
/// invariant the stored link must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceObservation {
    regular_price: Option<i64>,
    sale_price: Option<i64>,
}

impl PriceObservation {
    pub fn new(regular_price: Option<i64>, sale_price: Option<i64>) -> Self {
        let sale_price = match (regular_price, sale_price) {
            (Some(regular), Some(sale)) if sale < regular => Some(sale),
            _ => None,
        };

        Self {
            regular_price,
            sale_price,
        }
    }

    /// Observation with neither price found
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn regular_price(&self) -> Option<i64> {
        self.regular_price
    }

    pub fn sale_price(&self) -> Option<i64> {
        self.sale_price
    }

    pub fn prices(&self) -> (Option<i64>, Option<i64>) {
        (self.regular_price, self.sale_price)
    }

    pub fn is_absent(&self) -> bool {
        self.regular_price.is_none()
    }
}

/// Why a link could not be refreshed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// No regular price could be extracted (fetch error, unknown pharmacy, no match)
    NoPrice,
    /// The storage layer refused the update
    WriteRejected(String),
    /// Something in the link's pipeline panicked
    Panicked(String),
}

/// Result of pushing one link through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Updated,
    Unchanged,
    Failed(FailureReason),
}

/// Summary of one pass over all active links
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
    pub unchanged: usize,
}

impl BatchResult {
    /// Count one outcome; `total` always moves together with its bucket
    pub fn record(&mut self, outcome: &LinkOutcome) {
        self.total += 1;
        match outcome {
            LinkOutcome::Updated => self.updated += 1,
            LinkOutcome::Unchanged => self.unchanged += 1,
            LinkOutcome::Failed(_) => self.failed += 1,
        }
    }
}
