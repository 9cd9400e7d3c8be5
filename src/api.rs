use crate::error::CarrierResult;
use crate::models::{
    Document, LabelOptions, Manifest, ServiceType, ShipmentRequest, TrackingEvent, VendorError,
    VendorReply,
};
use crate::payload_log::ExchangeRecorder;

/// CTT Express API operations.
///
/// Business errors come back inside the [`VendorReply`] error list; `Err` is
/// reserved for transport failures. Each call writes its raw payloads to the
/// `exchange` recorder it is given.
#[async_trait::async_trait]
pub trait CttApi: Send + Sync {
    async fn validate_user(&self, exchange: &ExchangeRecorder) -> CarrierResult<Vec<VendorError>>;

    async fn get_service_types(
        &self,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Vec<ServiceType>>>;

    async fn manifest_shipping(
        &self,
        request: &ShipmentRequest,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Manifest>>;

    async fn get_documents_multi(
        &self,
        reference: &str,
        options: &LabelOptions,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Vec<Document>>>;

    async fn get_tracking(
        &self,
        reference: &str,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Vec<TrackingEvent>>>;
}
