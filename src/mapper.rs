//! Mapping between ERP pickings and CTT Express payloads.

use crate::host::{Partner, Picking};
use crate::models::{ShipmentRequest, TrackingEvent};

/// Process tag sent as `CreatedProcessCode`
pub const CREATED_PROCESS_CODE: &str = "ODOO";

/// Shipment reference, prefixed with the sale order when there is one.
pub fn shipment_reference(picking: &Picking) -> String {
    match picking.sale_order_name.as_deref().filter(|s| !s.is_empty()) {
        Some(sale) => format!("{}-{}", sale, picking.name),
        None => picking.name.clone(),
    }
}

/// Kilograms to grams, never below 1.
pub fn weight_in_grams(kilograms: f64) -> u64 {
    let grams = (kilograms * 1000.0).round();
    if grams.is_nan() || grams < 1.0 {
        1
    } else {
        grams as u64
    }
}

/// First non-blank value between a contact and its commercial entity
fn or_entity<F>(recipient: &Partner, entity: Option<&Partner>, field: F) -> Option<String>
where
    F: Fn(&Partner) -> &Option<String>,
{
    non_blank(field(recipient)).or_else(|| entity.and_then(|e| non_blank(field(e))))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Build the manifest payload for a picking.
///
/// The sender is the warehouse partner, since a picking can leave from any
/// warehouse, falling back to the company.
pub fn build_shipment_request(picking: &Picking, shipping_type: Option<&str>) -> ShipmentRequest {
    let sender = picking
        .warehouse_partner
        .as_ref()
        .unwrap_or(&picking.company_partner);
    let recipient = &picking.partner;
    let entity = picking.commercial_partner.as_ref();

    ShipmentRequest {
        client_reference: shipment_reference(picking),
        client_department_code: None,
        items_count: picking.number_of_packages,
        is_client_pod_scan_required: None,
        recipient_address: recipient.street.clone(),
        recipient_country: recipient.country_code.clone(),
        recipient_email: or_entity(recipient, entity, |p| &p.email),
        recipient_sms: None,
        recipient_mobile: or_entity(recipient, entity, |p| &p.mobile),
        recipient_name: or_entity(recipient, entity, |p| &p.name),
        recipient_phone: or_entity(recipient, entity, |p| &p.phone),
        recipient_postal_code: recipient.zip.clone(),
        recipient_town: recipient.city.clone(),
        refund_value: None,
        has_return: None,
        is_saturday_delivery: None,
        sender_address: sender.street.clone(),
        sender_name: sender.name.clone(),
        sender_phone: sender.phone.clone().unwrap_or_default(),
        sender_postal_code: sender.zip.clone(),
        sender_town: sender.city.clone(),
        shipping_comments: None,
        shipping_type_code: shipping_type.map(str::to_string),
        weight: weight_in_grams(picking.shipping_weight),
        pod_scan_instructions: None,
        is_fragile: None,
        refund_type_code: None,
        created_process_code: CREATED_PROCESS_CODE.to_string(),
        has_control: None,
        has_final_management: None,
    }
}

/// One tracking history line: `date - [code] description (incident) - detail`
pub fn format_tracking(event: &TrackingEvent) -> String {
    let mut status = format!(
        "{} - [{}] {}",
        event.status_date_time.format("%Y-%m-%d %H:%M:%S"),
        event.status_code,
        event.status_description
    );
    if let Some(incident) = event.incident_code.as_deref().filter(|c| !c.is_empty()) {
        status.push_str(&format!(
            " ({}) - {}",
            incident,
            event.incident_description.as_deref().unwrap_or_default()
        ));
    }
    status
}
