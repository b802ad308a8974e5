//! Salcobrand product page adapter

use crate::models::PriceObservation;
use crate::scrapers::first_above;
use crate::traits::{AdapterConfig, SiteAdapter};

pub struct SalcobrandAdapter {
    config: AdapterConfig,
}

impl SalcobrandAdapter {
    pub fn new() -> Self {
        Self {
            config: AdapterConfig {
                name: "Salcobrand",
                tokens: &["salcobrand"],
            },
        }
    }
}

impl Default for SalcobrandAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for SalcobrandAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    // Lowest amount is the sale; the first one above it is the list price.
    fn select_prices(&self, candidates: &[i64]) -> PriceObservation {
        let Some(&sale) = candidates.iter().min() else {
            return PriceObservation::absent();
        };

        let regular = first_above(candidates, sale).unwrap_or(sale);
        PriceObservation::new(Some(regular), Some(sale))
    }
}
