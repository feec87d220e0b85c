//! Outbound transport used by the client: a GET/POST pair returning status and body.

use crate::config::TransportConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

/// Status and body of a transport response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network primitive behind [`crate::FetcherClient`]. `config` carries headers and timeout.
/// Any HTTP status is a successful transport round trip; only I/O-level problems are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, config: &TransportConfig) -> Result<RawResponse, ClientError>;

    async fn post(
        &self,
        url: &str,
        body: String,
        config: &TransportConfig,
    ) -> Result<RawResponse, ClientError>;
}

/// [`Transport`] over HTTP using `reqwest`.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }

    fn prepare(
        &self,
        mut builder: reqwest::RequestBuilder,
        config: &TransportConfig,
    ) -> reqwest::RequestBuilder {
        for (name, value) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<RawResponse, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("request failed: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read body: {e}")))?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, config: &TransportConfig) -> Result<RawResponse, ClientError> {
        tracing::debug!(url = %url, "GET");
        let builder = self.prepare(self.client.get(url), config);
        self.send(builder).await
    }

    async fn post(
        &self,
        url: &str,
        body: String,
        config: &TransportConfig,
    ) -> Result<RawResponse, ClientError> {
        tracing::debug!(url = %url, "POST");
        let builder = self
            .prepare(self.client.post(url), config)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(builder).await
    }
}
