//! ERP-side records and the callbacks the carrier adapter runs against.

use serde::{Deserialize, Serialize};

use crate::error::CarrierResult;
use crate::master_data::DeliveryState;
use crate::models::{Document, TrackingUpdate};

/// Contact data of a sender or recipient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Partner {
    pub name: Option<String>,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
}

/// Outbound goods movement awaiting, or already handed to, the carrier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Picking {
    pub id: u64,
    pub name: String,
    pub sale_order_name: Option<String>,
    pub partner: Partner,
    /// Commercial entity of `partner`, used when the contact itself lacks data.
    pub commercial_partner: Option<Partner>,
    /// Partner of the warehouse the goods leave from
    pub warehouse_partner: Option<Partner>,
    pub company_partner: Partner,
    /// Kilograms
    pub shipping_weight: f64,
    pub number_of_packages: u32,
    pub carrier_tracking_ref: Option<String>,
    pub delivery_state: Option<DeliveryState>,
    pub tracking_state: Option<String>,
    pub tracking_state_history: Option<String>,
}

impl Picking {
    pub fn tracking_ref(&self) -> Option<&str> {
        self.carrier_tracking_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Per-record activity feed (chatter)
#[async_trait::async_trait]
pub trait MessageLog: Send + Sync {
    async fn post_message(
        &self,
        picking: &Picking,
        body: &str,
        attachments: Vec<Document>,
    ) -> CarrierResult<()>;
}

/// Access to pickings shipped with this carrier
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Pickings with a tracking reference whose delivery state isn't final.
    async fn pending_pickings(&self) -> CarrierResult<Vec<Picking>>;

    async fn write_tracking(&self, picking_id: u64, update: &TrackingUpdate) -> CarrierResult<()>;
}
