use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::api::CttApi;
use crate::config::Config;
use crate::error::{CarrierError, CarrierResult};
use crate::models::{
    Document, Exchange, LabelOptions, Manifest, ServiceType, ShipmentRequest, TrackingEvent,
    VendorError, VendorReply,
};
use crate::payload_log::ExchangeRecorder;

/// HTTP client for the CTT Express clients API (JSON binding)
pub struct ShipmentClient {
    config: Arc<Config>,
    http_client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Credentials<'a> {
    user: &'a str,
    password: &'a str,
    client_code: &'a str,
    agency_code: &'a str,
    contract_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsOnly<'a> {
    credentials: Credentials<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ManifestBody<'a> {
    credentials: Credentials<'a>,
    shipping: &'a ShipmentRequest,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentsBody<'a> {
    credentials: Credentials<'a>,
    shipping_codes: Vec<&'a str>,
    model_type_code: &'a str,
    kind_code: &'a str,
    offset: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TrackingBody<'a> {
    credentials: Credentials<'a>,
    shipping_code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireError {
    error_code: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ValidateUserResponse {
    #[serde(default)]
    errors: Vec<WireError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireServiceType {
    shipping_type_code: String,
    shipping_type_description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceTypesResponse {
    #[serde(default)]
    errors: Vec<WireError>,
    #[serde(default)]
    service_types: Vec<WireServiceType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDocument {
    file_name: String,
    file_content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ManifestResponse {
    #[serde(default)]
    errors: Vec<WireError>,
    #[serde(default)]
    shipping_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentsResponse {
    #[serde(default)]
    errors: Vec<WireError>,
    #[serde(default)]
    documents: Vec<WireDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireTrackingEvent {
    status_date_time: NaiveDateTime,
    status_code: String,
    status_description: String,
    #[serde(default)]
    incident_code: Option<String>,
    #[serde(default)]
    incident_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TrackingResponse {
    #[serde(default)]
    errors: Vec<WireError>,
    #[serde(default)]
    events: Vec<WireTrackingEvent>,
}

impl ShipmentClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let http_client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn credentials(&self) -> Credentials<'_> {
        Credentials {
            user: &self.config.user,
            password: &self.config.password,
            client_code: &self.config.customer,
            agency_code: &self.config.agency,
            contract_code: &self.config.contract,
        }
    }

    /// POST a JSON body to `{api_url}/{method}` and decode the reply.
    ///
    /// The exchange is recorded before sending, so a transport failure still
    /// leaves the request available for logging.
    async fn call<B, R>(
        &self,
        method: &str,
        body: &B,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), method);

        let mut payload =
            serde_json::to_value(body).map_err(|e| CarrierError::Parse(e.to_string()))?;
        let request = payload.to_string();
        if let Some(password) = payload.pointer_mut("/Credentials/Password") {
            *password = Value::String("********".to_string());
        }
        exchange.record(Exchange {
            method: method.to_string(),
            request: payload.to_string(),
            response: None,
        });

        debug!(url = %url, "CTT Express API request");

        let response = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        exchange.record_response(text.clone());

        if !status.is_success() {
            return Err(CarrierError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            CarrierError::Parse(format!(
                "JSON parse error: {} - Body: {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }
}

fn vendor_errors(errors: Vec<WireError>) -> Vec<VendorError> {
    errors
        .into_iter()
        .map(|e| VendorError {
            code: e.error_code.unwrap_or_default(),
            message: e.error_message.unwrap_or_default(),
        })
        .collect()
}

fn has_coded_errors(errors: &[VendorError]) -> bool {
    errors.iter().any(|e| !e.code.is_empty())
}

fn manifest_reply(response: ManifestResponse) -> VendorReply<Manifest> {
    VendorReply::with_errors(
        vendor_errors(response.errors),
        Manifest {
            tracking: response.shipping_code.unwrap_or_default(),
        },
    )
}

/// Documents are only decoded for replies without coded errors, so a rejected
/// request surfaces its vendor errors rather than a decoding failure.
fn documents_reply(response: DocumentsResponse) -> CarrierResult<VendorReply<Vec<Document>>> {
    let errors = vendor_errors(response.errors);
    if has_coded_errors(&errors) {
        return Ok(VendorReply::with_errors(errors, Vec::new()));
    }
    Ok(VendorReply::with_errors(
        errors,
        decode_documents(response.documents)?,
    ))
}

fn decode_documents(documents: Vec<WireDocument>) -> CarrierResult<Vec<Document>> {
    documents
        .into_iter()
        .map(|d| -> CarrierResult<Document> {
            let content = STANDARD.decode(d.file_content.trim()).map_err(|e| {
                CarrierError::Parse(format!("Invalid document {}: {}", d.file_name, e))
            })?;
            Ok(Document {
                name: d.file_name,
                content,
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl CttApi for ShipmentClient {
    async fn validate_user(&self, exchange: &ExchangeRecorder) -> CarrierResult<Vec<VendorError>> {
        let body = CredentialsOnly {
            credentials: self.credentials(),
        };
        let response: ValidateUserResponse = self.call("ValidateUser", &body, exchange).await?;
        Ok(vendor_errors(response.errors))
    }

    async fn get_service_types(
        &self,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Vec<ServiceType>>> {
        let body = CredentialsOnly {
            credentials: self.credentials(),
        };
        let response: ServiceTypesResponse =
            self.call("GetServiceTypes", &body, exchange).await?;

        let service_types = response
            .service_types
            .into_iter()
            .map(|s| ServiceType {
                code: s.shipping_type_code,
                description: s.shipping_type_description,
            })
            .collect();

        Ok(VendorReply::with_errors(
            vendor_errors(response.errors),
            service_types,
        ))
    }

    async fn manifest_shipping(
        &self,
        request: &ShipmentRequest,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Manifest>> {
        let body = ManifestBody {
            credentials: self.credentials(),
            shipping: request,
        };
        let response: ManifestResponse = self.call("ManifestShipping", &body, exchange).await?;

        Ok(manifest_reply(response))
    }

    async fn get_documents_multi(
        &self,
        reference: &str,
        options: &LabelOptions,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Vec<Document>>> {
        let body = DocumentsBody {
            credentials: self.credentials(),
            shipping_codes: vec![reference],
            model_type_code: &options.model_code,
            kind_code: &options.kind_code,
            offset: options.offset,
        };
        let response: DocumentsResponse = self.call("GetDocumentsV2", &body, exchange).await?;

        documents_reply(response)
    }

    async fn get_tracking(
        &self,
        reference: &str,
        exchange: &ExchangeRecorder,
    ) -> CarrierResult<VendorReply<Vec<TrackingEvent>>> {
        let body = TrackingBody {
            credentials: self.credentials(),
            shipping_code: reference,
        };
        let response: TrackingResponse =
            self.call("GetShippingHistory", &body, exchange).await?;

        let events = response
            .events
            .into_iter()
            .map(|e| TrackingEvent {
                status_date_time: e.status_date_time,
                status_code: e.status_code,
                status_description: e.status_description,
                incident_code: e.incident_code,
                incident_description: e.incident_description,
            })
            .collect();

        Ok(VendorReply::with_errors(vendor_errors(response.errors), events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::error::check_errors;
    use std::collections::HashMap;

    #[test]
    fn test_manifest_response_decoding() {
        let json = r#"{
            "Errors": [{"ErrorCode": null, "ErrorMessage": "OK"}],
            "ShippingCode": "ABC123",
            "Documents": [{"FileName": "ABC123.pdf", "FileContent": "JVBERi0="}]
        }"#;

        let reply = manifest_reply(serde_json::from_str(json).unwrap());

        assert_eq!(reply.errors, vec![VendorError::new("", "OK")]);
        assert_eq!(reply.payload.tracking, "ABC123");
    }

    #[test]
    fn test_manifest_errors_survive_bad_documents() {
        let json = r#"{
            "Errors": [{"ErrorCode": "E12", "ErrorMessage": "Invalid postal code"}],
            "Documents": [{"FileName": "x.pdf", "FileContent": "@@not-base64@@"}]
        }"#;

        let reply = manifest_reply(serde_json::from_str(json).unwrap());

        assert_eq!(reply.payload.tracking, "");
        let message = check_errors(&reply.errors).unwrap_err().to_string();
        assert!(message.contains("E12 - Invalid postal code"));
    }

    #[test]
    fn test_documents_reply() {
        let ok = r#"{"Documents": [{"FileName": "ABC123.pdf", "FileContent": "JVBERi0="}]}"#;
        let reply = documents_reply(serde_json::from_str(ok).unwrap()).unwrap();
        assert_eq!(reply.payload[0].name, "ABC123.pdf");
        assert_eq!(reply.payload[0].content, b"%PDF-".to_vec());

        let rejected = r#"{
            "Errors": [{"ErrorCode": "E7", "ErrorMessage": "Unknown shipping"}],
            "Documents": [{"FileName": "x.pdf", "FileContent": "@@not-base64@@"}]
        }"#;
        let reply = documents_reply(serde_json::from_str(rejected).unwrap()).unwrap();
        assert!(reply.payload.is_empty());
        assert_eq!(reply.errors, vec![VendorError::new("E7", "Unknown shipping")]);

        let corrupt = r#"{"Documents": [{"FileName": "x.pdf", "FileContent": "@@not-base64@@"}]}"#;
        assert!(matches!(
            documents_reply(serde_json::from_str(corrupt).unwrap()),
            Err(CarrierError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_masked_request() {
        let vars = HashMap::from([
            ("CTTEXPRESS_USER", "user"),
            ("CTTEXPRESS_PASSWORD", "secret"),
            ("CTTEXPRESS_CUSTOMER", "C001"),
            ("CTTEXPRESS_AGENCY", "A01"),
            ("CTTEXPRESS_CONTRACT", "K9"),
            ("CTTEXPRESS_API_URL", "http://127.0.0.1:1"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        let client = ShipmentClient::new(Arc::new(config)).unwrap();
        let recorder = ExchangeRecorder::default();

        let result = client.validate_user(&recorder).await;

        assert!(matches!(result, Err(CarrierError::Http(_))));
        let exchange = recorder.take().unwrap();
        assert_eq!(exchange.method, "ValidateUser");
        assert!(exchange.request.contains("\"ClientCode\":\"C001\""));
        assert!(!exchange.request.contains("secret"));
        assert_eq!(exchange.response, None);
    }

    #[test]
    fn test_tracking_response_decoding() {
        let json = r#"{
            "Events": [{
                "StatusDateTime": "2024-03-05T10:15:00",
                "StatusCode": "30",
                "StatusDescription": "Delivered"
            }]
        }"#;

        let response: TrackingResponse = serde_json::from_str(json).unwrap();

        assert!(response.errors.is_empty());
        assert_eq!(response.events.len(), 1);
        assert_eq!(response.events[0].incident_code, None);
    }

    #[test]
    fn test_invalid_document_content() {
        let documents = vec![WireDocument {
            file_name: "label.pdf".to_string(),
            file_content: "not base64!".to_string(),
        }];

        assert!(matches!(
            decode_documents(documents),
            Err(CarrierError::Parse(_))
        ));
    }

    #[test]
    fn test_shipment_request_field_names() {
        let body = serde_json::to_value(ManifestBody {
            credentials: Credentials {
                user: "u",
                password: "p",
                client_code: "c",
                agency_code: "a",
                contract_code: "k",
            },
            shipping: &crate::mapper::tests::sample_request(),
        })
        .unwrap();

        assert_eq!(body["Credentials"]["ClientCode"], "c");
        assert_eq!(body["Shipping"]["RecipientSMS"], Value::Null);
        assert_eq!(body["Shipping"]["CreatedProcessCode"], "ODOO");
        assert_eq!(body["Shipping"]["Weight"], 2345);
    }
}
