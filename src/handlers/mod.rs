//! HTTP handling for fetcher reads and envelopes.

pub mod resource;
pub use resource::*;
