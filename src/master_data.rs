//! Static CTT Express master data: services, label options and delivery states.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Known shipping services, `(code, label)`.
pub const CTTEXPRESS_SERVICES: &[(&str, &str)] = &[
    ("ENCF005.01", "19"),
    ("EMSF010.01", "19 Múltiplo"),
    ("EMSF028.01", "13 Múltiplo"),
];

static SERVICE_LABELS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CTTEXPRESS_SERVICES.iter().copied().collect());

/// Display label of a service code. Unknown codes display as themselves.
pub fn service_label(code: &str) -> &str {
    SERVICE_LABELS.get(code).copied().unwrap_or(code)
}

/// Label sheet layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentModel {
    #[default]
    Single,
    Multi1,
    Multi3,
    Multi4,
}

impl DocumentModel {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentModel::Single => "SINGLE",
            DocumentModel::Multi1 => "MULTI1",
            DocumentModel::Multi3 => "MULTI3",
            DocumentModel::Multi4 => "MULTI4",
        }
    }
}

impl FromStr for DocumentModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SINGLE" => Ok(DocumentModel::Single),
            "MULTI1" => Ok(DocumentModel::Multi1),
            "MULTI3" => Ok(DocumentModel::Multi3),
            "MULTI4" => Ok(DocumentModel::Multi4),
            other => Err(format!(
                "unknown document model '{}' (expected SINGLE, MULTI1, MULTI3 or MULTI4)",
                other
            )),
        }
    }
}

/// Label file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Png,
    Bmp,
}

impl DocumentFormat {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Png => "PNG",
            DocumentFormat::Bmp => "BMP",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PDF" => Ok(DocumentFormat::Pdf),
            "PNG" => Ok(DocumentFormat::Png),
            "BMP" => Ok(DocumentFormat::Bmp),
            other => Err(format!(
                "unknown document format '{}' (expected PDF, PNG or BMP)",
                other
            )),
        }
    }
}

/// ERP delivery state of a picking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    ShippingRecordedInCarrier,
    InTransit,
    CanceledShipment,
    Incidence,
    WarehouseDelivered,
    CustomerDelivered,
}

/// Vendor tracking status code to delivery state
static DELIVERY_STATES_STATIC: Lazy<HashMap<&'static str, DeliveryState>> = Lazy::new(|| {
    HashMap::from([
        ("10", DeliveryState::ShippingRecordedInCarrier),
        ("20", DeliveryState::InTransit),
        ("21", DeliveryState::InTransit),
        ("30", DeliveryState::CustomerDelivered),
        ("31", DeliveryState::WarehouseDelivered),
        ("40", DeliveryState::Incidence),
        ("50", DeliveryState::Incidence),
        ("90", DeliveryState::CanceledShipment),
    ])
});

impl DeliveryState {
    /// Map a vendor status code. Anything unmapped is an incidence.
    pub fn from_status_code(code: &str) -> Self {
        DELIVERY_STATES_STATIC
            .get(code.trim())
            .copied()
            .unwrap_or(DeliveryState::Incidence)
    }

    /// Final states are no longer refreshed.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            DeliveryState::CustomerDelivered | DeliveryState::CanceledShipment
        )
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeliveryState::ShippingRecordedInCarrier => "shipping_recorded_in_carrier",
            DeliveryState::InTransit => "in_transit",
            DeliveryState::CanceledShipment => "canceled_shipment",
            DeliveryState::Incidence => "incidence",
            DeliveryState::WarehouseDelivered => "warehouse_delivered",
            DeliveryState::CustomerDelivered => "customer_delivered",
        };
        f.write_str(s)
    }
}

/// ERP pricing method this carrier type requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceMethod {
    /// Priced from the carrier's delivery rules
    BaseOnRule,
}
