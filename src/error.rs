use thiserror::Error;

use crate::models::VendorError;

/// Errors surfaced by the carrier adapter.
///
/// Every variant stops the current operation; there is no partial success.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// One or more coded entries returned by the vendor, already aggregated.
    #[error("CTT Express Error:\n\n{0}")]
    Vendor(String),

    #[error(
        "This CTT Express service ({service_name}) isn't allowed for this account configuration. \
         Please choose one of the followings\n{choices}"
    )]
    ServiceNotAllowed { service_name: String, choices: String },

    #[error("Not provided by the CTT Express API")]
    Unsupported,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Host error: {0}")]
    Host(String),
}

pub type CarrierResult<T> = Result<T, CarrierError>;

impl CarrierError {
    /// True for errors meant to be shown to the user as-is, as opposed to
    /// transport failures.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CarrierError::Vendor(_) | CarrierError::ServiceNotAllowed { .. } | CarrierError::Unsupported
        )
    }
}

/// Common error checking for every vendor reply.
///
/// Entries with an empty code are skipped. When any coded entry remains, all of
/// them are joined as `code - message` lines into a single `Vendor` error.
pub fn check_errors(errors: &[VendorError]) -> CarrierResult<()> {
    let error_msg: String = errors
        .iter()
        .filter(|e| !e.code.is_empty())
        .map(|e| format!("{} - {}\n", e.code, e.message))
        .collect();

    if error_msg.is_empty() {
        return Ok(());
    }

    Err(CarrierError::Vendor(error_msg))
}
