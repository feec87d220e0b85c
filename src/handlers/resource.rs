//! Fetcher middleware: turns GET matrix reads and POST envelopes under the path prefix into
//! dispatcher calls, and renders the outcome. Everything else goes to the next service.

use crate::error::DispatchError;
use crate::matrix;
use crate::request::{Operation, Request, RequestContext, RequestEnvelope};
use crate::response::{envelope_response, failure_response, success_response, Failure};
use crate::state::FetcherState;
use axum::{
    extract::{Request as HttpRequest, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Outcome of normalizing one transport request.
#[derive(Debug)]
pub enum Normalized {
    /// GET read; rendered as the bare success value.
    Read(Request),
    /// POST envelope entry; rendered under its envelope id.
    Enveloped(Request),
    /// POST with no entries; answered with 204 and never dispatched.
    Empty,
}

/// True when `path` is the prefix itself or lies below it.
pub fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .map(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(false)
}

/// Build the read request for the part of a GET path after `{prefix}/resource/`.
pub fn normalize_get(matrix_segment: &str) -> Normalized {
    let (resource, params) = matrix::decode(matrix_segment);
    Normalized::Read(Request::new(resource, Operation::Read).with_params(params))
}

/// Parse a POST body into its single request. An empty body counts as an empty envelope.
pub fn normalize_post(body: &[u8]) -> Result<Normalized, Failure> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Normalized::Empty);
    }
    let envelope: RequestEnvelope = serde_json::from_slice(body).map_err(|e| {
        Failure::new(
            StatusCode::BAD_REQUEST.as_u16(),
            format!("invalid request envelope: {}", e),
        )
    })?;
    Ok(envelope
        .into_single()
        .map(Normalized::Enveloped)
        .unwrap_or(Normalized::Empty))
}

/// Dispatch a normalized request and render the result.
pub async fn respond(state: &FetcherState, req: &RequestContext, normalized: Normalized) -> Response {
    let (request, enveloped) = match normalized {
        Normalized::Empty => return StatusCode::NO_CONTENT.into_response(),
        Normalized::Read(request) => (request, false),
        Normalized::Enveloped(request) => (request, true),
    };
    match state.dispatcher.dispatch(req, &request).await {
        Ok(payload) if enveloped => envelope_response(&request.id, payload),
        Ok(payload) => success_response(payload),
        Err(DispatchError::NotFound(name)) => {
            tracing::warn!(resource = %request.resource, "no fetcher registered for {}", name);
            DispatchError::NotFound(name).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Axum middleware entry point; install with `axum::middleware::from_fn_with_state`.
pub async fn fetcher_middleware(
    State(state): State<FetcherState>,
    request: HttpRequest,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !under_prefix(path, &state.config.path_prefix) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    match method {
        Method::GET => {
            let resource_path = state.config.resource_path();
            let Some(segment) = path.strip_prefix(resource_path.as_str()).map(str::to_owned) else {
                return next.run(request).await;
            };
            let (parts, _) = request.into_parts();
            let req = RequestContext::from(&parts);
            respond(&state, &req, normalize_get(&segment)).await
        }
        Method::POST => {
            let (parts, body) = request.into_parts();
            let req = RequestContext::from(&parts);
            let bytes = match axum::body::to_bytes(body, state.config.max_body_bytes).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read request envelope");
                    return failure_response(Failure::new(
                        StatusCode::BAD_REQUEST.as_u16(),
                        format!("unreadable request body: {}", e),
                    ));
                }
            };
            match normalize_post(&bytes) {
                Ok(normalized) => respond(&state, &req, normalized).await,
                Err(failure) => {
                    tracing::warn!(reason = failure.message_or_default(), "rejected request envelope");
                    failure_response(failure)
                }
            }
        }
        _ => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ParamValue;
    use serde_json::json;

    #[test]
    fn prefix_gate_respects_segment_boundary() {
        assert!(under_prefix("/api", "/api"));
        assert!(under_prefix("/api/resource/x", "/api"));
        assert!(!under_prefix("/apiary", "/api"));
        assert!(!under_prefix("/health", "/api"));
    }

    #[test]
    fn get_segment_becomes_read() {
        let Normalized::Read(request) = normalize_get("r;a=1;b=2") else {
            panic!("expected a read");
        };
        assert_eq!(request.resource, "r");
        assert_eq!(request.operation, Operation::Read);
        assert_eq!(request.params["a"], ParamValue::from("1"));
        assert_eq!(request.params["b"], ParamValue::from("2"));
        assert!(request.body.is_none());
        assert!(request.context.is_empty());
    }

    #[test]
    fn post_with_no_entries_is_empty() {
        let body = serde_json::to_vec(&json!({"requests": {}, "context": {}})).unwrap();
        assert!(matches!(normalize_post(&body), Ok(Normalized::Empty)));
        assert!(matches!(normalize_post(b"{}"), Ok(Normalized::Empty)));
        assert!(matches!(normalize_post(b""), Ok(Normalized::Empty)));
    }

    #[test]
    fn malformed_post_is_bad_request() {
        let failure = normalize_post(b"{not json").unwrap_err();
        assert_eq!(failure.status_code, Some(400));
        assert!(failure.message_or_default().starts_with("invalid request envelope"));

        let body = serde_json::to_vec(&json!({
            "requests": {"g0": {"resource": "r", "operation": "explode"}}
        }))
        .unwrap();
        assert!(normalize_post(&body).is_err());
    }

    #[test]
    fn post_entry_carries_envelope_context() {
        let body = serde_json::to_vec(&json!({
            "requests": {"g0": {"resource": "r", "operation": "update", "params": {"id": "7"}, "body": {"a": 1}}},
            "context": {"_csrf": "t"}
        }))
        .unwrap();
        let Ok(Normalized::Enveloped(request)) = normalize_post(&body) else {
            panic!("expected an enveloped request");
        };
        assert_eq!(request.id, "g0");
        assert_eq!(request.operation, Operation::Update);
        assert_eq!(request.params["id"], ParamValue::from("7"));
        assert_eq!(request.body, Some(json!({"a": 1})));
        assert_eq!(request.context.get("_csrf"), Some(&json!("t")));
    }
}
