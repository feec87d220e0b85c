//! The CRUD call surface shared by in-process (server) and remote (client) callers.

use crate::request::{Context, Operation, Params, Request};
use crate::response::Failure;
use async_trait::async_trait;
use serde_json::Value;

/// Issue a resource operation. Implemented by [`crate::ServerFetcher`] and
/// [`crate::FetcherClient`], so calling code is identical on both sides.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn call(&self, request: Request) -> Result<Value, Failure>;

    async fn create(
        &self,
        resource: &str,
        params: Params,
        body: Value,
        context: Context,
    ) -> Result<Value, Failure> {
        let request = Request::new(resource, Operation::Create)
            .with_params(params)
            .with_body(body)
            .with_context(context);
        self.call(request).await
    }

    async fn read(&self, resource: &str, params: Params, context: Context) -> Result<Value, Failure> {
        let request = Request::new(resource, Operation::Read)
            .with_params(params)
            .with_context(context);
        self.call(request).await
    }

    async fn update(
        &self,
        resource: &str,
        params: Params,
        body: Value,
        context: Context,
    ) -> Result<Value, Failure> {
        let request = Request::new(resource, Operation::Update)
            .with_params(params)
            .with_body(body)
            .with_context(context);
        self.call(request).await
    }

    async fn delete(&self, resource: &str, params: Params, context: Context) -> Result<Value, Failure> {
        let request = Request::new(resource, Operation::Delete)
            .with_params(params)
            .with_context(context);
        self.call(request).await
    }
}
