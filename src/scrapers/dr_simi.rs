//! Dr. Simi product page adapter

use crate::models::PriceObservation;
use crate::traits::{AdapterConfig, SiteAdapter};

/// Dr. Simi lists the sale price and the regular price as the first two
/// amounts on the page, in either order.
pub struct DrSimiAdapter {
    config: AdapterConfig,
}

impl DrSimiAdapter {
    pub fn new() -> Self {
        Self {
            config: AdapterConfig {
                name: "Dr. Simi",
                tokens: &["drsimi", "dr. simi", "dr simi"],
            },
        }
    }
}

impl Default for DrSimiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for DrSimiAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn select_prices(&self, candidates: &[i64]) -> PriceObservation {
        match candidates {
            [first, second, ..] => {
                let regular = (*first).max(*second);
                let sale = (*first).min(*second);
                PriceObservation::new(Some(regular), Some(sale))
            }
            [only] => PriceObservation::new(Some(*only), None),
            [] => PriceObservation::absent(),
        }
    }
}
