//! Shared state for the fetcher middleware. The registry is read-only once built.

use crate::config::{validate, FetcherConfig};
use crate::dispatch::{Dispatcher, ServerFetcher};
use crate::error::ConfigError;
use crate::registry::FetcherRegistry;
use crate::request::RequestContext;
use std::sync::Arc;

#[derive(Clone)]
pub struct FetcherState {
    pub config: Arc<FetcherConfig>,
    pub dispatcher: Dispatcher,
}

impl FetcherState {
    pub fn new(config: FetcherConfig, registry: FetcherRegistry) -> Result<Self, ConfigError> {
        validate(&config)?;
        Ok(FetcherState {
            config: Arc::new(config),
            dispatcher: Dispatcher::new(Arc::new(registry)),
        })
    }

    /// In-process caller for server code (e.g. page rendering) sharing this registry.
    pub fn server_fetcher(&self, req: RequestContext) -> ServerFetcher {
        ServerFetcher::new(self.dispatcher.clone(), req)
    }
}
