//! Compares fresh observations with stored prices and writes only on change

use tracing::{debug, warn};

use crate::models::{FailureReason, LinkOutcome, PharmacyLink, PriceObservation};
use crate::traits::LinkStore;

/// What to do with one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing usable was extracted
    Failed,
    /// Observation matches the stored pair exactly
    Unchanged,
    /// Observation differs and must be persisted
    Write,
}

pub fn decide(link: &PharmacyLink, observation: &PriceObservation) -> Decision {
    if observation.is_absent() {
        Decision::Failed
    } else if observation.prices() == link.stored_prices() {
        Decision::Unchanged
    } else {
        Decision::Write
    }
}

/// Apply an observation to a link, persisting it when the prices moved
pub async fn reconcile(
    store: &dyn LinkStore,
    link: &PharmacyLink,
    observation: PriceObservation,
) -> LinkOutcome {
    match decide(link, &observation) {
        Decision::Failed => LinkOutcome::Failed(FailureReason::NoPrice),
        Decision::Unchanged => {
            debug!(link_id = %link.id, "Prices unchanged");
            LinkOutcome::Unchanged
        }
        Decision::Write => {
            let (regular, sale) = observation.prices();
            match store.update_prices(&link.id, regular, sale).await {
                Ok(()) => {
                    debug!(
                        link_id = %link.id,
                        old_regular = ?link.regular_price,
                        old_sale = ?link.sale_price,
                        new_regular = ?regular,
                        new_sale = ?sale,
                        "Prices updated"
                    );
                    LinkOutcome::Updated
                }
                Err(e) => {
                    warn!(link_id = %link.id, error = %e, "Failed to persist prices");
                    LinkOutcome::Failed(FailureReason::WriteRejected(format!("{e:#}")))
                }
            }
        }
    }
}
