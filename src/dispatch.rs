//! Route a canonical request to its fetcher and invoke the matching capability.

use crate::error::DispatchError;
use crate::fetch::Fetch;
use crate::registry::FetcherRegistry;
use crate::request::{Operation, Request, RequestContext};
use crate::response::{Failure, Payload};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<FetcherRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<FetcherRegistry>) -> Self {
        Dispatcher { registry }
    }

    pub fn registry(&self) -> &FetcherRegistry {
        &self.registry
    }

    /// Invoke the fetcher selected by the request's namespace. The fetcher's result is
    /// returned as-is; only a missing fetcher is reported by the dispatcher itself.
    pub async fn dispatch(
        &self,
        req: &RequestContext,
        request: &Request,
    ) -> Result<Payload, DispatchError> {
        tracing::debug!(
            resource = %request.resource,
            operation = %request.operation,
            id = %request.id,
            "dispatch"
        );
        let fetcher = self.registry.lookup(request.lookup_key())?;
        let resource = request.resource.as_str();
        let params = &request.params;
        let context = &request.context;
        let empty_body = Value::Object(Map::new());
        let body = request.body.as_ref().unwrap_or(&empty_body);

        let result = match request.operation {
            Operation::Create => fetcher.create(req, resource, params, body, context).await,
            Operation::Read => fetcher.read(req, resource, params, context).await,
            Operation::Update => fetcher.update(req, resource, params, body, context).await,
            Operation::Delete => fetcher.delete(req, resource, params, context).await,
        };
        if let Err(failure) = &result {
            tracing::debug!(
                resource = %request.resource,
                status = failure.status().as_u16(),
                "fetcher failed"
            );
        }
        result.map_err(DispatchError::Handler)
    }
}

/// In-process caller bound to one transport request (or none, for background work).
#[derive(Clone)]
pub struct ServerFetcher {
    dispatcher: Dispatcher,
    req: RequestContext,
}

impl ServerFetcher {
    pub fn new(dispatcher: Dispatcher, req: RequestContext) -> Self {
        ServerFetcher { dispatcher, req }
    }
}

#[async_trait]
impl Fetch for ServerFetcher {
    async fn call(&self, request: Request) -> Result<Value, Failure> {
        self.dispatcher
            .dispatch(&self.req, &request)
            .await
            .map(|payload| payload.data)
            .map_err(DispatchError::into_failure)
    }
}
