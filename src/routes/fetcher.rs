//! Mount the fetcher middleware on a router.

use crate::handlers::fetcher_middleware;
use crate::state::FetcherState;
use axum::{http::StatusCode, middleware, Router};

/// Standalone router answering only fetcher traffic; anything else is 404.
/// To share a server with other routes use [`with_fetcher`] instead.
pub fn fetcher_router(state: FetcherState) -> Router {
    Router::new()
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(state, fetcher_middleware))
}

/// Wrap an existing router so fetcher traffic is intercepted before its routes.
/// Add this after all routes and the fallback.
pub fn with_fetcher(router: Router, state: FetcherState) -> Router {
    router.layer(middleware::from_fn_with_state(state, fetcher_middleware))
}
