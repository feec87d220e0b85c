pub mod fetcher;

pub use fetcher::{fetcher_router, with_fetcher};
