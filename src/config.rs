use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

use crate::master_data::{DocumentFormat, DocumentModel};
use crate::models::LabelOptions;

pub const PROD_API_URL: &str = "https://iberws.tourlineexpress.com/ClientsAPI.svc/json";
pub const TEST_API_URL: &str = "https://iberws-pre.tourlineexpress.com:8700/ClientsAPI.svc/json";

/// CTT Express carrier configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub user: String,
    pub password: String,
    pub customer: String,
    pub agency: String,
    pub contract: String,
    pub prod_environment: bool,
    pub api_url: String,
    pub shipping_type: Option<String>,
    pub document_model: DocumentModel,
    pub document_format: DocumentFormat,
    pub document_offset: i32,
    pub debug_logging: bool,
    pub validation_ok_codes: Vec<String>,
    pub cron_schedule: String,
    pub shipments_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    /// - `CTTEXPRESS_USER`: Required - API user
    /// - `CTTEXPRESS_PASSWORD`: Required - API password
    /// - `CTTEXPRESS_CUSTOMER`: Required - Customer code
    /// - `CTTEXPRESS_AGENCY`: Required - Agency code
    /// - `CTTEXPRESS_CONTRACT`: Required - Contract code
    /// - `CTTEXPRESS_SHIPPING_TYPE`: Optional - Default service code
    /// - `CTTEXPRESS_DOCUMENT_MODEL`: Optional - SINGLE, MULTI1, MULTI3 or MULTI4 (default: SINGLE)
    /// - `CTTEXPRESS_DOCUMENT_FORMAT`: Optional - PDF, PNG or BMP (default: PDF)
    /// - `CTTEXPRESS_DOCUMENT_OFFSET`: Optional - Label offset (default: 0)
    /// - `CTTEXPRESS_PROD`: Optional - Use the production endpoint (default: false)
    /// - `CTTEXPRESS_API_URL`: Optional - Endpoint override
    /// - `CTTEXPRESS_DEBUG_LOGGING`: Optional - Log request/response payloads (default: false)
    /// - `CTTEXPRESS_VALIDATION_OK_CODES`: Optional - Comma-separated codes tolerated on user validation
    /// - `CRON_SCHEDULE`: Optional - Tracking refresh cron expression (default: "0 */30 * * * *")
    /// - `CTTEXPRESS_SHIPMENTS_FILE`: Optional - JSON shipment store (default: "shipments.json")
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] against an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            let value = lookup(key).with_context(|| format!("{} not set", key))?;
            if value.trim().is_empty() {
                bail!("{} cannot be empty", key);
            }
            Ok(value)
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let user = required("CTTEXPRESS_USER")?;
        let password = required("CTTEXPRESS_PASSWORD")?;
        let customer = required("CTTEXPRESS_CUSTOMER")?;
        let agency = required("CTTEXPRESS_AGENCY")?;
        let contract = required("CTTEXPRESS_CONTRACT")?;

        let prod_environment = match optional("CTTEXPRESS_PROD") {
            Some(v) => parse_bool(&v).context("CTTEXPRESS_PROD must be a boolean")?,
            None => false,
        };

        let api_url = optional("CTTEXPRESS_API_URL").unwrap_or_else(|| {
            if prod_environment {
                PROD_API_URL.to_string()
            } else {
                TEST_API_URL.to_string()
            }
        });

        let shipping_type = optional("CTTEXPRESS_SHIPPING_TYPE").map(|v| v.trim().to_string());

        let document_model = match optional("CTTEXPRESS_DOCUMENT_MODEL") {
            Some(v) => v
                .parse::<DocumentModel>()
                .map_err(anyhow::Error::msg)
                .context("Invalid CTTEXPRESS_DOCUMENT_MODEL")?,
            None => DocumentModel::default(),
        };

        let document_format = match optional("CTTEXPRESS_DOCUMENT_FORMAT") {
            Some(v) => v
                .parse::<DocumentFormat>()
                .map_err(anyhow::Error::msg)
                .context("Invalid CTTEXPRESS_DOCUMENT_FORMAT")?,
            None => DocumentFormat::default(),
        };

        let document_offset = match optional("CTTEXPRESS_DOCUMENT_OFFSET") {
            Some(v) => v
                .trim()
                .parse::<i32>()
                .context("CTTEXPRESS_DOCUMENT_OFFSET must be an integer")?,
            None => 0,
        };

        let debug_logging = match optional("CTTEXPRESS_DEBUG_LOGGING") {
            Some(v) => parse_bool(&v).context("CTTEXPRESS_DEBUG_LOGGING must be a boolean")?,
            None => false,
        };

        let validation_ok_codes = optional("CTTEXPRESS_VALIDATION_OK_CODES")
            .map(|v| {
                v.split(',')
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cron_schedule =
            optional("CRON_SCHEDULE").unwrap_or_else(|| "0 */30 * * * *".to_string());

        let shipments_file = optional("CTTEXPRESS_SHIPMENTS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("shipments.json"));

        Ok(Config {
            user,
            password,
            customer,
            agency,
            contract,
            prod_environment,
            api_url,
            shipping_type,
            document_model,
            document_format,
            document_offset,
            debug_logging,
            validation_ok_codes,
            cron_schedule,
            shipments_file,
        })
    }

    pub fn label_options(&self) -> LabelOptions {
        LabelOptions {
            model_code: self.document_model.code().to_string(),
            kind_code: self.document_format.code().to_string(),
            offset: self.document_offset,
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("'{}' is not a boolean", other),
    }
}
