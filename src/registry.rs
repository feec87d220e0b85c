//! Fetcher contract and the name → fetcher registry.
//!
//! The registry is built once by the composition root and then shared read-only
//! (behind an `Arc`) with the dispatcher, so lookups need no locking.

use crate::error::{ConfigError, DispatchError};
use crate::request::{Context, Params, RequestContext};
use crate::response::{Failure, Payload};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub type FetchResult = Result<Payload, Failure>;

/// A resource handler implementing the four CRUD capabilities.
///
/// `resource` is the full resource identifier (including any `ns.sub` suffix);
/// only the part before the first `.` selects the fetcher.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Registry key. Must be non-empty.
    fn name(&self) -> &str;

    async fn create(
        &self,
        req: &RequestContext,
        resource: &str,
        params: &Params,
        body: &Value,
        context: &Context,
    ) -> FetchResult;

    async fn read(
        &self,
        req: &RequestContext,
        resource: &str,
        params: &Params,
        context: &Context,
    ) -> FetchResult;

    async fn update(
        &self,
        req: &RequestContext,
        resource: &str,
        params: &Params,
        body: &Value,
        context: &Context,
    ) -> FetchResult;

    async fn delete(
        &self,
        req: &RequestContext,
        resource: &str,
        params: &Params,
        context: &Context,
    ) -> FetchResult;
}

#[derive(Clone, Default)]
pub struct FetcherRegistry {
    by_name: HashMap<String, Arc<dyn Fetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        FetcherRegistry {
            by_name: HashMap::new(),
        }
    }

    /// Store a fetcher under its name. A second fetcher with the same name replaces the first.
    pub fn register(&mut self, fetcher: Arc<dyn Fetcher>) -> Result<(), ConfigError> {
        let name = fetcher.name().to_string();
        if name.is_empty() {
            return Err(ConfigError::MissingName);
        }
        if self.by_name.insert(name.clone(), fetcher).is_some() {
            tracing::warn!("fetcher {} registered twice, keeping the latest", name);
        } else {
            tracing::info!(fetcher = %name, "registered fetcher");
        }
        Ok(())
    }

    /// Builder-style registration for startup code.
    pub fn with<F: Fetcher>(mut self, fetcher: F) -> Result<Self, ConfigError> {
        self.register(Arc::new(fetcher))?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Fetcher>> {
        self.by_name.get(name)
    }

    /// Fetcher registered under `name`; empty or unknown names are `NotFound`.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Fetcher>, DispatchError> {
        if name.is_empty() {
            return Err(DispatchError::NotFound(name.to_string()));
        }
        self.get(name)
            .cloned()
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
