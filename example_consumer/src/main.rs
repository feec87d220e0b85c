//! Example consumer: serves an in-memory `notes` fetcher behind the fetcher middleware.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Then: `curl 'http://127.0.0.1:3000/api/resource/notes;id=1'`

use axum::{routing::get, Json, Router};
use resource_fetcher::{
    async_trait, with_fetcher, Context, Failure, FetchResult, Fetcher, FetcherConfig,
    FetcherRegistry, FetcherState, Params, Payload, RequestContext,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tokio::net::TcpListener;

/// Notes keyed by the `id` param.
#[derive(Default)]
struct Notes {
    by_id: RwLock<BTreeMap<String, Value>>,
}

fn note_id(params: &Params) -> Result<String, Failure> {
    params
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| Failure::new(400, "id param is required"))
}

fn poisoned() -> Failure {
    Failure::new(500, "notes store unavailable")
}

#[async_trait]
impl Fetcher for Notes {
    fn name(&self) -> &str {
        "notes"
    }

    async fn create(&self, _: &RequestContext, _: &str, params: &Params, body: &Value, _: &Context) -> FetchResult {
        let id = note_id(params)?;
        let mut notes = self.by_id.write().map_err(|_| poisoned())?;
        if notes.contains_key(&id) {
            return Err(Failure::new(409, format!("note {} already exists", id)));
        }
        notes.insert(id, body.clone());
        Ok(Payload::new(body.clone()).with_status(201))
    }

    async fn read(&self, _: &RequestContext, resource: &str, params: &Params, _: &Context) -> FetchResult {
        let notes = self.by_id.read().map_err(|_| poisoned())?;
        if resource == "notes.all" {
            return Ok(Payload::new(json!(*notes)));
        }
        let id = note_id(params)?;
        notes
            .get(&id)
            .cloned()
            .map(|note| Payload::new(note).with_header("cache-control", "no-store"))
            .ok_or_else(|| Failure::new(404, format!("note {} not found", id)))
    }

    async fn update(&self, _: &RequestContext, _: &str, params: &Params, body: &Value, _: &Context) -> FetchResult {
        let id = note_id(params)?;
        let mut notes = self.by_id.write().map_err(|_| poisoned())?;
        match notes.get_mut(&id) {
            Some(note) => {
                *note = body.clone();
                Ok(Payload::new(body.clone()))
            }
            None => Err(Failure::new(404, format!("note {} not found", id))),
        }
    }

    async fn delete(&self, _: &RequestContext, _: &str, params: &Params, _: &Context) -> FetchResult {
        let id = note_id(params)?;
        let mut notes = self.by_id.write().map_err(|_| poisoned())?;
        notes
            .remove(&id)
            .map(|_| Payload::new(json!({ "deleted": id.clone() })))
            .ok_or_else(|| Failure::new(404, format!("note {} not found", id)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resource_fetcher=info")),
        )
        .init();

    let config = FetcherConfig::from_env()?;
    let registry = FetcherRegistry::new().with(Notes::default())?;
    let state = FetcherState::new(config, registry)?;

    let host = Router::new().route("/health", get(|| async { Json(json!({ "status": "ok" })) }));
    let app = with_fetcher(host, state);

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    let port = listener.local_addr()?.port();
    tracing::info!("Example consumer listening on http://127.0.0.1:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
