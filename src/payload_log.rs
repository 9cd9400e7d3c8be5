use std::sync::Mutex;
use tracing::debug;

use crate::models::Exchange;

/// Request/response payloads of a single vendor call.
#[derive(Debug, Default)]
pub struct ExchangeRecorder {
    slot: Mutex<Option<Exchange>>,
}

impl ExchangeRecorder {
    pub fn record(&self, exchange: Exchange) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(exchange);
        }
    }

    pub fn record_response(&self, response: String) {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(exchange) = slot.as_mut() {
                exchange.response = Some(response);
            }
        }
    }

    pub fn take(&self) -> Option<Exchange> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Logs the exchange of one vendor call when dropped.
///
/// Create one right before the call and hand [`PayloadLog::recorder`] to it,
/// so the payloads get logged on every exit path, including `?` propagation.
pub struct PayloadLog {
    recorder: ExchangeRecorder,
    operation: &'static str,
    enabled: bool,
}

impl PayloadLog {
    pub fn new(operation: &'static str, enabled: bool) -> Self {
        Self {
            recorder: ExchangeRecorder::default(),
            operation,
            enabled,
        }
    }

    pub fn recorder(&self) -> &ExchangeRecorder {
        &self.recorder
    }
}

impl Drop for PayloadLog {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        match self.recorder.take() {
            Some(exchange) => {
                debug!(
                    target: "cttexpress::payload",
                    operation = self.operation,
                    method = %exchange.method,
                    "ctt_request: {}",
                    exchange.request
                );
                debug!(
                    target: "cttexpress::payload",
                    operation = self.operation,
                    method = %exchange.method,
                    "ctt_response: {}",
                    exchange.response.as_deref().unwrap_or("<no response>")
                );
            }
            None => {
                debug!(
                    target: "cttexpress::payload",
                    operation = self.operation,
                    "no exchange recorded"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(method: &str) -> Exchange {
        Exchange {
            method: method.to_string(),
            request: format!("{{\"call\":\"{}\"}}", method),
            response: None,
        }
    }

    #[test]
    fn test_recorder_keeps_response_with_its_request() {
        let recorder = ExchangeRecorder::default();
        recorder.record(exchange("ValidateUser"));
        recorder.record_response("{\"Errors\":[]}".to_string());

        let recorded = recorder.take().unwrap();
        assert_eq!(recorded.method, "ValidateUser");
        assert_eq!(recorded.response.as_deref(), Some("{\"Errors\":[]}"));
        assert_eq!(recorder.take(), None);
    }

    #[test]
    fn test_response_without_request_is_dropped() {
        let recorder = ExchangeRecorder::default();
        recorder.record_response("orphan".to_string());
        assert_eq!(recorder.take(), None);
    }

    #[test]
    fn test_guards_do_not_share_exchanges() {
        let first = PayloadLog::new("validate_user", false);
        let second = PayloadLog::new("get_service_types", false);
        first.recorder().record(exchange("ValidateUser"));
        second.recorder().record(exchange("GetServiceTypes"));

        assert_eq!(first.recorder().take().unwrap().method, "ValidateUser");
        assert_eq!(second.recorder().take().unwrap().method, "GetServiceTypes");
    }
}
