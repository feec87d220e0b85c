//! Client-side request builder: the mirror of the fetcher middleware.
//!
//! Reads become `GET {prefix}/resource/{name};k=v...`; create, update and delete become a
//! `POST {prefix}?{context}` carrying a single-entry request envelope.

pub mod transport;
pub mod unmarshal;

pub use transport::{HttpTransport, RawResponse, Transport};
pub use unmarshal::{decode_envelope, decode_failure, decode_read};

use crate::config::{validate_client, CallConfig, ClientConfig, RESOURCE_SEGMENT};
use crate::error::{ClientError, ConfigError};
use crate::fetch::Fetch;
use crate::matrix::{self, encode_component};
use crate::request::{Context, Operation, Params, Request, RequestEnvelope};
use crate::response::Failure;
use async_trait::async_trait;
use serde_json::Value;

pub struct FetcherClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl FetcherClient<HttpTransport> {
    /// Client over HTTP with a default `reqwest` client.
    pub fn http(config: ClientConfig) -> Result<Self, ConfigError> {
        FetcherClient::new(config, HttpTransport::default())
    }
}

impl<T: Transport> FetcherClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Result<Self, ConfigError> {
        validate_client(&config)?;
        Ok(FetcherClient { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn read_url(&self, resource: &str, params: &Params) -> String {
        format!(
            "{}{}{}{}",
            self.config.base_url,
            self.config.path_prefix,
            RESOURCE_SEGMENT,
            matrix::encode(resource, params)
        )
    }

    /// Envelope endpoint; scalar context entries (e.g. `_csrf`) ride along as query parameters.
    pub fn post_url(&self, context: &Context) -> String {
        let query: Vec<String> = context
            .iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some(format!("{}={}", encode_component(key), encode_component(&value)))
            })
            .collect();
        let mut url = format!("{}{}", self.config.base_url, self.config.path_prefix);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    fn merged_context(&self, call: Context) -> Context {
        let mut context = self.config.context.clone();
        context.extend(call);
        context
    }

    /// Issue one request with per-call overrides layered over the client config.
    pub async fn call_with(&self, request: Request, overrides: &CallConfig) -> Result<Value, ClientError> {
        let config = self.config.merged(overrides);
        let mut request = request;
        request.context = self.merged_context(std::mem::take(&mut request.context));
        tracing::debug!(resource = %request.resource, operation = %request.operation, "client call");

        match request.operation {
            Operation::Read => {
                let url = self.read_url(&request.resource, &request.params);
                let raw = self.transport.get(&url, &config).await?;
                decode_read(raw)
            }
            Operation::Create | Operation::Update | Operation::Delete => {
                let url = self.post_url(&request.context);
                let body = serde_json::to_string(&RequestEnvelope::single(&request))?;
                let raw = self.transport.post(&url, body, &config).await?;
                decode_envelope(raw, &request.id)
            }
        }
    }
}

#[async_trait]
impl<T: Transport> Fetch for FetcherClient<T> {
    async fn call(&self, request: Request) -> Result<Value, Failure> {
        self.call_with(request, &CallConfig::default())
            .await
            .map_err(Failure::from)
    }
}
