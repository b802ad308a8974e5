//! Cruz Verde product page adapter

use crate::models::PriceObservation;
use crate::traits::{AdapterConfig, SiteAdapter};

/// Cruz Verde repeats prices in several widgets, so the extremes are used.
pub struct CruzVerdeAdapter {
    config: AdapterConfig,
}

impl CruzVerdeAdapter {
    pub fn new() -> Self {
        Self {
            config: AdapterConfig {
                name: "Cruz Verde",
                tokens: &["cruzverde", "cruz verde"],
            },
        }
    }
}

impl Default for CruzVerdeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for CruzVerdeAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn select_prices(&self, candidates: &[i64]) -> PriceObservation {
        let (Some(&min), Some(&max)) = (candidates.iter().min(), candidates.iter().max()) else {
            return PriceObservation::absent();
        };

        PriceObservation::new(Some(max), Some(min))
    }
}
