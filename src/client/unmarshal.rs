//! Turn transport responses back into fetcher success values or failures.

use crate::client::RawResponse;
use crate::error::ClientError;
use crate::response::{Failure, ResponseEnvelope};
use serde_json::{Map, Value};

/// Failure carried by a non-2xx response. A JSON failure body is used as-is (status filled in
/// from the transport when absent); any other body becomes the message.
pub fn decode_failure(status: u16, body: &str) -> Failure {
    let parsed = serde_json::from_str::<Failure>(body)
        .ok()
        .filter(|f| f.status_code.is_some() || f.message.is_some());
    match parsed {
        Some(mut failure) => {
            failure.status_code.get_or_insert(status);
            failure
        }
        None => {
            let text = body.trim();
            Failure {
                status_code: Some(status),
                message: (!text.is_empty()).then(|| text.to_string()),
                extra: Map::new(),
            }
        }
    }
}

fn ensure_success(raw: &RawResponse) -> Result<(), ClientError> {
    if raw.is_success() {
        Ok(())
    } else {
        Err(ClientError::Failure(decode_failure(raw.status, &raw.body)))
    }
}

fn parse_body(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// GET responses are not enveloped.
pub fn decode_read(raw: RawResponse) -> Result<Value, ClientError> {
    ensure_success(&raw)?;
    parse_body(&raw.body)
}

/// POST responses are `{ <id>: { data } }`; returns the `data` of entry `id`.
pub fn decode_envelope(raw: RawResponse, id: &str) -> Result<Value, ClientError> {
    ensure_success(&raw)?;
    if raw.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    let mut envelope: ResponseEnvelope = serde_json::from_str(&raw.body)?;
    envelope
        .remove(id)
        .map(|entry| entry.data)
        .ok_or_else(|| ClientError::Decode(format!("response envelope has no entry '{}'", id)))
}
