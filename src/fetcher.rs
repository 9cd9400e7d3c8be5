use std::sync::Arc;
use tracing::{error, info};

use crate::carrier::CttExpressCarrier;
use crate::error::CarrierResult;
use crate::host::RecordStore;

/// Refreshes tracking values of every pending picking.
pub struct TrackingFetcher {
    carrier: Arc<CttExpressCarrier>,
    store: Arc<dyn RecordStore>,
}

impl TrackingFetcher {
    pub fn new(carrier: Arc<CttExpressCarrier>, store: Arc<dyn RecordStore>) -> Self {
        Self { carrier, store }
    }

    /// Returns how many pickings got new tracking values.
    ///
    /// A failing picking is logged and skipped; only a store failure while
    /// listing pickings aborts the run.
    pub async fn run(&self) -> CarrierResult<usize> {
        let pickings = self.store.pending_pickings().await?;
        let mut updated = 0;

        for picking in pickings {
            let update = match self.carrier.tracking_state_update(&picking).await {
                Ok(Some(update)) => update,
                Ok(None) => {
                    info!(picking = %picking.name, "No tracking events yet");
                    continue;
                }
                Err(e) => {
                    error!(picking = %picking.name, error = %e, "Tracking refresh failed");
                    continue;
                }
            };

            if let Err(e) = self.store.write_tracking(picking.id, &update).await {
                error!(picking = %picking.name, error = %e, "Failed to store tracking values");
                continue;
            }

            info!(
                picking = %picking.name,
                delivery_state = %update.delivery_state,
                status = %update.tracking_state,
                "Tracking refreshed"
            );
            updated += 1;
        }

        Ok(updated)
    }
}
