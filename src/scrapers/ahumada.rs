//! Farmacias Ahumada product page adapter

use crate::models::PriceObservation;
use crate::scrapers::first_above;
use crate::traits::{AdapterConfig, SiteAdapter};

/// Ahumada renders the price actually charged last on the page.
pub struct AhumadaAdapter {
    config: AdapterConfig,
}

impl AhumadaAdapter {
    pub fn new() -> Self {
        Self {
            config: AdapterConfig {
                name: "Ahumada",
                tokens: &["ahumada"],
            },
        }
    }
}

impl Default for AhumadaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for AhumadaAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn select_prices(&self, candidates: &[i64]) -> PriceObservation {
        let Some(&sale) = candidates.last() else {
            return PriceObservation::absent();
        };

        let regular = first_above(candidates, sale).unwrap_or(sale);
        PriceObservation::new(Some(regular), Some(sale))
    }
}
