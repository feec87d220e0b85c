//! Resource fetcher: one CRUD call surface, dispatched in-process on the server or sent
//! over HTTP from a client, routed to registered fetchers by resource name.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod matrix;
pub mod registry;
pub mod request;
pub mod response;
pub mod routes;
pub mod state;

pub use client::{FetcherClient, HttpTransport, RawResponse, Transport};
pub use config::{CallConfig, ClientConfig, FetcherConfig, TransportConfig, DEFAULT_PATH_PREFIX};
pub use dispatch::{Dispatcher, ServerFetcher};
pub use error::{ClientError, ConfigError, DispatchError};
pub use fetch::Fetch;
pub use handlers::fetcher_middleware;
pub use registry::{FetchResult, Fetcher, FetcherRegistry};
pub use request::{Context, Operation, ParamValue, Params, Request, RequestContext, RequestEnvelope};
pub use response::{Failure, Payload, ResponseMeta};
pub use routes::{fetcher_router, with_fetcher};
pub use state::FetcherState;

pub use async_trait::async_trait;
