use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::master_data::DeliveryState;

/// One `(code, message)` entry of a vendor error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorError {
    pub code: String,
    pub message: String,
}

impl VendorError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Every vendor call answers with an error list plus its payload.
#[derive(Debug, Clone)]
pub struct VendorReply<T> {
    pub errors: Vec<VendorError>,
    pub payload: T,
}

impl<T> VendorReply<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            errors: Vec::new(),
            payload,
        }
    }

    pub fn with_errors(errors: Vec<VendorError>, payload: T) -> Self {
        Self { errors, payload }
    }
}

/// Raw payloads of one vendor round trip, kept for debug logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub method: String,
    pub request: String,
    pub response: Option<String>,
}

/// Shipping service allowed for the current credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceType {
    pub code: String,
    pub description: String,
}

/// Named binary document, such as a shipping label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub content: Vec<u8>,
}

/// Shipment manifest payload as the vendor expects it.
///
/// Optional fields the ERP can't fill are sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShipmentRequest {
    pub client_reference: String,
    pub client_department_code: Option<String>,
    pub items_count: u32,
    pub is_client_pod_scan_required: Option<bool>,
    pub recipient_address: Option<String>,
    pub recipient_country: Option<String>,
    pub recipient_email: Option<String>,
    #[serde(rename = "RecipientSMS")]
    pub recipient_sms: Option<String>,
    pub recipient_mobile: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub recipient_postal_code: Option<String>,
    pub recipient_town: Option<String>,
    pub refund_value: Option<f64>,
    pub has_return: Option<bool>,
    pub is_saturday_delivery: Option<bool>,
    pub sender_address: Option<String>,
    pub sender_name: Option<String>,
    pub sender_phone: String,
    pub sender_postal_code: Option<String>,
    pub sender_town: Option<String>,
    pub shipping_comments: Option<String>,
    pub shipping_type_code: Option<String>,
    /// Weight in grams
    pub weight: u64,
    pub pod_scan_instructions: Option<String>,
    pub is_fragile: Option<bool>,
    pub refund_type_code: Option<String>,
    pub created_process_code: String,
    pub has_control: Option<bool>,
    pub has_final_management: Option<bool>,
}

/// Reply payload of a manifest call.
///
/// Labels are fetched separately with the configured format, so the documents
/// bundled in the manifest reply are not kept.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub tracking: String,
}

/// Label request options taken from the carrier configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelOptions {
    pub model_code: String,
    pub kind_code: String,
    pub offset: i32,
}

/// One event of the vendor tracking history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status_date_time: NaiveDateTime,
    pub status_code: String,
    pub status_description: String,
    pub incident_code: Option<String>,
    pub incident_description: Option<String>,
}

/// Per-picking outcome of a send, written back by the ERP workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentResult {
    pub tracking_number: String,
    /// Always zero: the API doesn't return prices.
    pub exact_price: f64,
}

/// Tracking values refreshed on a picking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub tracking_state: String,
    pub tracking_state_history: String,
    pub delivery_state: DeliveryState,
}
