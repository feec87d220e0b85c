//! Success and failure values produced by fetchers, and their transport rendering.

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_FAILURE_STATUS: StatusCode = StatusCode::BAD_REQUEST;
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// Response metadata a fetcher may attach to a success value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Success value of a fetcher call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
    pub data: Value,
    pub meta: Option<ResponseMeta>,
}

impl Payload {
    pub fn new(data: Value) -> Self {
        Payload { data, meta: None }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.meta.get_or_insert_with(ResponseMeta::default).status_code = Some(status_code);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta
            .get_or_insert_with(ResponseMeta::default)
            .headers
            .insert(name.into(), value.into());
        self
    }

    /// Transport status for this success: meta override when it is a valid HTTP status, else 200.
    pub fn status(&self) -> StatusCode {
        self.meta
            .as_ref()
            .and_then(|m| m.status_code)
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK)
    }
}

impl From<Value> for Payload {
    fn from(data: Value) -> Self {
        Payload::new(data)
    }
}

/// Failure value of a fetcher call. Missing fields fall back to 400 / "request failed".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Failure {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Failure {
            status_code: Some(status_code),
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(DEFAULT_FAILURE_STATUS)
    }

    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_FAILURE_MESSAGE)
    }

    /// Copy with status and message filled in, as written to the transport.
    pub fn resolved(&self) -> Failure {
        Failure {
            status_code: Some(self.status().as_u16()),
            message: Some(self.message_or_default().to_string()),
            extra: self.extra.clone(),
        }
    }
}

/// One entry of a POST response envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeEntry {
    #[serde(default)]
    pub data: Value,
}

/// POST response: `{ <id>: { data: ... } }`.
pub type ResponseEnvelope = BTreeMap<String, EnvelopeEntry>;

fn apply_meta(response: &mut Response, meta: Option<&ResponseMeta>) {
    let Some(meta) = meta else { return };
    for (name, value) in &meta.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "skipping invalid response header from fetcher"),
        }
    }
}

/// GET rendering: the bare success value.
pub fn success_response(payload: Payload) -> Response {
    let status = payload.status();
    let mut response = (status, Json(payload.data)).into_response();
    apply_meta(&mut response, payload.meta.as_ref());
    response
}

/// POST rendering: the success value wrapped under its envelope id.
pub fn envelope_response(id: &str, payload: Payload) -> Response {
    let status = payload.status();
    let mut envelope = ResponseEnvelope::new();
    envelope.insert(id.to_string(), EnvelopeEntry { data: payload.data });
    let mut response = (status, Json(envelope)).into_response();
    apply_meta(&mut response, payload.meta.as_ref());
    response
}

pub fn failure_response(failure: Failure) -> Response {
    let resolved = failure.resolved();
    (resolved.status(), Json(resolved)).into_response()
}
