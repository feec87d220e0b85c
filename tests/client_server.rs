//! Client and server agree on the wire protocol: the client is driven against the real
//! middleware through an in-process transport.

mod common;

use axum::{body::Body, http::Request as HttpRequest, Router};
use common::*;
use resource_fetcher::{
    async_trait, ClientConfig, ClientError, Context, Fetch, FetcherClient, ParamValue, Params,
    RawResponse, RequestContext, ResponseMeta, Transport, TransportConfig,
};
use serde_json::json;
use tower::ServiceExt;

struct InProcess {
    app: Router,
}

impl InProcess {
    async fn exchange(
        &self,
        method: &str,
        url: &str,
        body: Body,
        config: &TransportConfig,
    ) -> Result<RawResponse, ClientError> {
        let mut builder = HttpRequest::builder().method(method).uri(url);
        for (name, value) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .header("content-type", "application/json")
            .body(body)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(RawResponse::new(status, String::from_utf8_lossy(&bytes)))
    }
}

#[async_trait]
impl Transport for InProcess {
    async fn get(&self, url: &str, config: &TransportConfig) -> Result<RawResponse, ClientError> {
        self.exchange("GET", url, Body::empty(), config).await
    }

    async fn post(&self, url: &str, body: String, config: &TransportConfig) -> Result<RawResponse, ClientError> {
        self.exchange("POST", url, Body::from(body), config).await
    }
}

fn client(h: &Harness) -> FetcherClient<InProcess> {
    let mut context = Context::new();
    context.insert("_csrf".into(), json!("stuff"));
    FetcherClient::new(
        ClientConfig::default().with_context(context),
        InProcess { app: h.app.clone() },
    )
    .unwrap()
}

fn params() -> Params {
    let mut params = Params::new();
    params.insert("uuids".into(), ParamValue::from(vec!["1", "2", "3", "4", "5"]));
    params.insert("category".into(), ParamValue::from(""));
    params.insert("selected_filter".into(), ParamValue::from("YPROP:TOPSTORIES"));
    params
}

#[tokio::test]
async fn read_round_trips_params() {
    let h = harness();
    let data = client(&h).read(FAKE, params(), Context::new()).await.unwrap();

    assert_eq!(data["operation"]["name"], json!("read"));
    assert_eq!(
        data["args"]["params"],
        json!({"uuids": ["1", "2", "3", "4", "5"], "category": "", "selected_filter": "YPROP:TOPSTORIES"})
    );
}

#[tokio::test]
async fn mutations_round_trip_envelope() {
    let h = harness();
    let client = client(&h);

    let data = client
        .create(FAKE, params(), json!({"stuff": "is"}), Context::new())
        .await
        .unwrap();
    assert_eq!(data["operation"]["name"], json!("create"));
    assert_eq!(data["args"]["body"], json!({"stuff": "is"}));
    assert_eq!(data["args"]["context"], json!({"_csrf": "stuff"}));

    let data = client
        .update(FAKE, params(), json!({"stuff": "was"}), Context::new())
        .await
        .unwrap();
    assert_eq!(data["operation"]["name"], json!("update"));

    let data = client.delete(FAKE, params(), Context::new()).await.unwrap();
    assert_eq!(data["operation"]["name"], json!("delete"));
    assert_eq!(h.fake.calls(), 3);
}

#[tokio::test]
async fn meta_status_does_not_change_client_result() {
    let h = harness();
    h.fake.set_meta(ResponseMeta {
        status_code: Some(201),
        ..Default::default()
    });
    let data = client(&h)
        .create(FAKE, Params::new(), json!({}), Context::new())
        .await
        .unwrap();
    assert_eq!(data["operation"]["name"], json!("create"));
}

#[tokio::test]
async fn failures_reach_the_caller() {
    let h = harness();
    let client = client(&h);

    let mut failing = Params::new();
    failing.insert("statusCode".into(), ParamValue::from("500"));
    failing.insert("message".into(), ParamValue::from("boom"));
    let failure = client.read(FAKE_ERROR, failing, Context::new()).await.unwrap_err();
    assert_eq!(failure.status_code, Some(500));
    assert_eq!(failure.message.as_deref(), Some("boom"));

    let failure = client
        .update(FAKE_ERROR, Params::new(), json!({}), Context::new())
        .await
        .unwrap_err();
    assert_eq!(failure.status_code, Some(400));
    assert_eq!(failure.message_or_default(), "request failed");
    assert_eq!(failure.extra.get("update"), Some(&json!("error")));

    let failure = client.delete("nobody", Params::new(), Context::new()).await.unwrap_err();
    assert_eq!(failure.status_code, Some(404));
}

#[tokio::test]
async fn server_and_client_calls_agree() {
    let h = harness();
    let server = h.state.server_fetcher(RequestContext::default());

    let remote = client(&h).read(FAKE, params(), Context::new()).await.unwrap();
    let local = server.read(FAKE, params(), Context::new()).await.unwrap();
    assert_eq!(remote, local);

    let remote = client(&h)
        .read(FAKE_ERROR, Params::new(), Context::new())
        .await
        .unwrap_err();
    let local = server
        .read(FAKE_ERROR, Params::new(), Context::new())
        .await
        .unwrap_err();
    assert_eq!(remote.status(), local.status());
    assert_eq!(remote.message_or_default(), local.message_or_default());
}
