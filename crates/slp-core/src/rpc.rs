//! # Backend RPC Envelope
//!
//! All six backend services reply with `{data, hasError, status, statusText}`.
//! The gateway never inspects `data` on failure; it only classifies the
//! status into one of three client-facing kinds.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope shared by every backend service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcEnvelope<T = Value> {
    #[serde(default)]
    pub data: T,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
}

/// Client-facing classification of a failed RPC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcFailureKind {
    BadRequest,
    Unauthorized,
    NotFound,
}

impl RpcFailureKind {
    /// 401 and 404 keep their meaning; every other status is a bad request.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            _ => Self::BadRequest,
        }
    }
}

/// A backend service reported `hasError: true`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("backend rejected request ({status}): {message}")]
pub struct RpcFailure {
    pub kind: RpcFailureKind,
    /// Status reported by the backend, before classification.
    pub status: u16,
    pub message: String,
}

impl RpcFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: RpcFailureKind::from_status(status),
            status,
            message: message.into(),
        }
    }
}

impl<T> RpcEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            has_error: false,
            status: 200,
            status_text: String::new(),
        }
    }

    /// Unwrap the data or classify the failure. `data` is dropped on error.
    pub fn into_result(self) -> Result<T, RpcFailure> {
        if self.has_error {
            return Err(RpcFailure::new(self.status, self.status_text));
        }
        Ok(self.data)
    }
}

impl RpcEnvelope<Value> {
    pub fn error(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            data: Value::Null,
            has_error: true,
            status,
            status_text: status_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_found_carries_message() {
        let env: RpcEnvelope = serde_json::from_value(json!({
            "data": {"ignored": true},
            "hasError": true,
            "status": 404,
            "statusText": "X"
        }))
        .unwrap();
        let err = env.into_result().unwrap_err();
        assert_eq!(err.kind, RpcFailureKind::NotFound);
        assert_eq!(err.message, "X");
        assert_eq!(err.status, 404);
    }

    #[test]
    fn success_returns_data_unchanged() {
        let data = json!({"id": "abc", "nested": [1, 2]});
        let env = RpcEnvelope::ok(data.clone());
        assert_eq!(env.into_result().unwrap(), data);
    }

    #[test]
    fn status_classification() {
        assert_eq!(RpcFailureKind::from_status(400), RpcFailureKind::BadRequest);
        assert_eq!(RpcFailureKind::from_status(401), RpcFailureKind::Unauthorized);
        assert_eq!(RpcFailureKind::from_status(404), RpcFailureKind::NotFound);
        assert_eq!(RpcFailureKind::from_status(409), RpcFailureKind::BadRequest);
        assert_eq!(RpcFailureKind::from_status(500), RpcFailureKind::BadRequest);
    }

    #[test]
    fn missing_data_defaults_to_null() {
        let env: RpcEnvelope = serde_json::from_value(json!({
            "hasError": false,
            "status": 204,
            "statusText": ""
        }))
        .unwrap();
        assert!(env.into_result().unwrap().is_null());
    }

    #[test]
    fn typed_data_deserializes() {
        #[derive(Debug, Default, Deserialize, PartialEq)]
        struct Created {
            id: String,
        }
        let env: RpcEnvelope<Created> = serde_json::from_value(json!({
            "data": {"id": "r1"},
            "hasError": false,
            "status": 201,
            "statusText": "Created"
        }))
        .unwrap();
        assert_eq!(env.into_result().unwrap(), Created { id: "r1".into() });
    }
}
