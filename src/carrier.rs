//! CTT Express delivery carrier.
//!
//! Entry points the ERP shipping workflow calls into: credential validation,
//! service checks, shipment sending, labels, cancellation and tracking.

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::CttApi;
use crate::config::Config;
use crate::error::{CarrierError, CarrierResult, check_errors};
use crate::host::{MessageLog, Picking};
use crate::mapper;
use crate::master_data::{DeliveryState, PriceMethod, service_label};
use crate::models::{Document, ShipmentRequest, ShipmentResult, TrackingEvent, TrackingUpdate};
use crate::payload_log::PayloadLog;

pub const TRACKING_URL: &str =
    "https://www.ctt.pt/feapl_2/app/open/objectSearch/objectSearch.jspx?request_locale=en";

pub struct CttExpressCarrier {
    config: Arc<Config>,
    api: Arc<dyn CttApi>,
}

impl CttExpressCarrier {
    pub fn new(config: Arc<Config>, api: Arc<dyn CttApi>) -> Self {
        Self { config, api }
    }

    fn payload_log(&self, operation: &'static str) -> PayloadLog {
        PayloadLog::new(operation, self.config.debug_logging)
    }

    /// Price method forced when this carrier type is selected, as the API
    /// can't gather prices.
    pub fn price_method(&self) -> PriceMethod {
        PriceMethod::BaseOnRule
    }

    /// Check the configured credentials against the API.
    ///
    /// The vendor answers a successful validation with a coded entry as well;
    /// codes listed in `validation_ok_codes` are tolerated.
    pub async fn validate_user(&self) -> CarrierResult<()> {
        let errors = {
            let log = self.payload_log("validate_user");
            self.api.validate_user(log.recorder()).await?
        };

        let (tolerated, errors): (Vec<_>, Vec<_>) = errors
            .into_iter()
            .partition(|e| self.config.validation_ok_codes.contains(&e.code));
        for entry in &tolerated {
            warn!(
                code = %entry.code,
                message = %entry.message,
                "Tolerated CTT Express validation code"
            );
        }

        check_errors(&errors)
    }

    /// Control service validity according to the credentials.
    ///
    /// Nothing is checked when no service is set or when the credentials
    /// themselves don't validate.
    pub async fn check_service_type(&self) -> CarrierResult<()> {
        let Some(shipping_type) = self.config.shipping_type.as_deref() else {
            return Ok(());
        };

        match self.validate_user().await {
            Ok(()) => {}
            Err(e) if e.is_user_facing() => return Ok(()),
            Err(e) => return Err(e),
        }

        let reply = {
            let log = self.payload_log("get_service_types");
            self.api.get_service_types(log.recorder()).await?
        };
        check_errors(&reply.errors)?;

        if reply.payload.iter().any(|s| s.code == shipping_type) {
            return Ok(());
        }

        let choices = reply
            .payload
            .iter()
            .map(|s| format!("{} - {}", s.code, s.description))
            .collect::<Vec<_>>()
            .join("\n");

        Err(CarrierError::ServiceNotAllowed {
            service_name: service_label(shipping_type).to_string(),
            choices,
        })
    }

    pub fn prepare_shipping(&self, picking: &Picking) -> ShipmentRequest {
        mapper::build_shipment_request(picking, self.config.shipping_type.as_deref())
    }

    /// Manifest every picking and attach its label.
    ///
    /// Pickings are processed in order and the first error aborts the batch.
    pub async fn send_shipping(
        &self,
        pickings: &[Picking],
        chatter: &dyn MessageLog,
    ) -> CarrierResult<Vec<ShipmentResult>> {
        let mut result = Vec::with_capacity(pickings.len());

        for picking in pickings {
            let request = self.prepare_shipping(picking);

            let manifest = {
                let log = self.payload_log("manifest_shipping");
                let reply = self
                    .api
                    .manifest_shipping(&request, log.recorder())
                    .await?;
                check_errors(&reply.errors)?;
                reply.payload
            };
            let tracking = manifest.tracking;

            info!(
                picking = %picking.name,
                reference = %request.client_reference,
                tracking = %tracking,
                "CTT Express shipment manifested"
            );

            // The manifest call can't choose the label format, so the label is
            // requested again with the configured options.
            let documents = self.get_label(&tracking).await?;
            let attached = documents.len();
            chatter
                .post_message(picking, "CTT Shipping Documents", documents)
                .await?;
            info!(picking = %picking.name, attached, "CTT Express documents posted");

            result.push(ShipmentResult {
                tracking_number: tracking,
                exact_price: 0.0,
            });
        }

        Ok(result)
    }

    /// Shipping label documents for a tracking reference.
    ///
    /// Empty when the reference is blank or the API returns nothing.
    pub async fn get_label(&self, reference: &str) -> CarrierResult<Vec<Document>> {
        if reference.trim().is_empty() {
            return Ok(Vec::new());
        }

        let options = self.config.label_options();
        let log = self.payload_log("get_documents_multi");
        let reply = self
            .api
            .get_documents_multi(reference, &options, log.recorder())
            .await?;
        check_errors(&reply.errors)?;

        Ok(reply.payload)
    }

    pub fn cancel_shipment(&self, _pickings: &[Picking]) -> CarrierResult<()> {
        Err(CarrierError::Unsupported)
    }

    /// Public tracking page. The URL has no slot for the tracking reference,
    /// so every picking gets the same link.
    pub fn tracking_link(&self, _picking: &Picking) -> String {
        TRACKING_URL.to_string()
    }

    pub fn format_tracking(&self, event: &TrackingEvent) -> String {
        mapper::format_tracking(event)
    }

    /// Refresh tracking values from the shipment history.
    ///
    /// Returns `None` when the picking has no tracking reference or the API
    /// has no events for it yet.
    pub async fn tracking_state_update(
        &self,
        picking: &Picking,
    ) -> CarrierResult<Option<TrackingUpdate>> {
        let Some(reference) = picking.tracking_ref() else {
            return Ok(None);
        };

        let events = {
            let log = self.payload_log("get_tracking");
            let reply = self.api.get_tracking(reference, log.recorder()).await?;
            check_errors(&reply.errors)?;
            reply.payload
        };

        let Some(current) = events.last() else {
            return Ok(None);
        };

        let tracking_state_history = events
            .iter()
            .map(mapper::format_tracking)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Some(TrackingUpdate {
            tracking_state: mapper::format_tracking(current),
            tracking_state_history,
            delivery_state: DeliveryState::from_status_code(&current.status_code),
        }))
    }
}
