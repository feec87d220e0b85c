//! Fixture fetchers and router helpers shared by the integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use resource_fetcher::{
    async_trait, with_fetcher, Context, FetchResult, Failure, Fetcher, FetcherConfig,
    FetcherRegistry, FetcherState, Params, Payload, RequestContext, ResponseMeta,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const FAKE: &str = "fake_fetcher";
pub const FAKE_ERROR: &str = "fake_error_fetcher";

/// Echoes its arguments. `meta` is attached to the next response only.
#[derive(Default)]
pub struct FakeFetcher {
    pub meta: Mutex<Option<ResponseMeta>>,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn set_meta(&self, meta: ResponseMeta) {
        *self.meta.lock().unwrap() = Some(meta);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(
        &self,
        operation: &str,
        resource: &str,
        params: &Params,
        body: Option<&Value>,
        context: &Context,
    ) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let meta = self.meta.lock().unwrap().take();
        Ok(Payload {
            data: json!({
                "operation": {"name": operation, "success": true},
                "args": {
                    "resource": resource,
                    "params": params,
                    "body": body,
                    "context": context,
                },
            }),
            meta,
        })
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    fn name(&self) -> &str {
        FAKE
    }

    async fn create(&self, _: &RequestContext, resource: &str, params: &Params, body: &Value, context: &Context) -> FetchResult {
        self.respond("create", resource, params, Some(body), context)
    }

    async fn read(&self, _: &RequestContext, resource: &str, params: &Params, context: &Context) -> FetchResult {
        self.respond("read", resource, params, None, context)
    }

    async fn update(&self, _: &RequestContext, resource: &str, params: &Params, body: &Value, context: &Context) -> FetchResult {
        self.respond("update", resource, params, Some(body), context)
    }

    async fn delete(&self, _: &RequestContext, resource: &str, params: &Params, context: &Context) -> FetchResult {
        self.respond("delete", resource, params, None, context)
    }
}

/// Always fails, with `statusCode` and `message` taken from params when present.
pub struct FakeErrorFetcher;

fn fail(operation: &str, params: &Params) -> FetchResult {
    let mut failure = Failure {
        status_code: params
            .get("statusCode")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok()),
        message: params
            .get("message")
            .and_then(|v| v.as_str())
            .map(String::from),
        extra: Default::default(),
    };
    failure.extra.insert(operation.to_string(), json!("error"));
    Err(failure)
}

#[async_trait]
impl Fetcher for FakeErrorFetcher {
    fn name(&self) -> &str {
        FAKE_ERROR
    }

    async fn create(&self, _: &RequestContext, _: &str, params: &Params, _: &Value, _: &Context) -> FetchResult {
        fail("create", params)
    }

    async fn read(&self, _: &RequestContext, _: &str, params: &Params, _: &Context) -> FetchResult {
        fail("read", params)
    }

    async fn update(&self, _: &RequestContext, _: &str, params: &Params, _: &Value, _: &Context) -> FetchResult {
        fail("update", params)
    }

    async fn delete(&self, _: &RequestContext, _: &str, params: &Params, _: &Context) -> FetchResult {
        fail("delete", params)
    }
}

pub struct Harness {
    pub app: Router,
    pub state: FetcherState,
    pub fake: Arc<FakeFetcher>,
}

pub fn harness_with(config: FetcherConfig) -> Harness {
    let fake = Arc::new(FakeFetcher::default());
    let mut registry = FetcherRegistry::new();
    registry.register(fake.clone()).unwrap();
    registry.register(Arc::new(FakeErrorFetcher)).unwrap();
    let state = FetcherState::new(config, registry).unwrap();

    let host = Router::new()
        .route("/health", get(|| async { "ok" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "host fallback") });
    Harness {
        app: with_fetcher(host, state.clone()),
        state,
        fake,
    }
}

pub fn harness() -> Harness {
    harness_with(FetcherConfig::default())
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
    pub headers: axum::http::HeaderMap,
}

pub async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        body,
        text,
        headers,
    }
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn post_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
