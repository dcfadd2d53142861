//! Vordr - offline-first fetch gateway
//!
//! Vordr intercepts same-origin GET requests and serves them through one
//! of three caching strategies — cache-first for static assets,
//! network-first for dynamic API paths, stale-while-revalidate for
//! everything else — over named, version-qualified cache generations that
//! are replaced wholesale on deploy.
//!
//! The host platform provides the interception point and drives an
//! explicit [`Worker`] through its lifecycle: `on_install()` precaches
//! the static asset manifest atomically, `on_activate()` prunes obsolete
//! generations and claims open contexts, `on_fetch()` answers intercepted
//! requests.
//!
//! # Example
//!
//! ```rust,no_run
//! use vordr::{FetchOutcome, FetchRequest, Vordr};
//!
//! #[tokio::main]
//! async fn main() -> vordr::Result<()> {
//!     let worker = Vordr::builder()
//!         .origin("https://example.app")
//!         .version("2026-08")
//!         .shell("/index.html")
//!         .precache(["/index.html", "/styles/main.css", "/scripts/app.js"])
//!         .build()?;
//!
//!     worker.on_install().await?;
//!
//!     let request = FetchRequest::navigate("https://example.app/")?;
//!     match worker.on_fetch(&request).await? {
//!         FetchOutcome::Response(response) => {
//!             println!("served with status {}", response.status);
//!         }
//!         FetchOutcome::PassThrough => println!("left to the browser"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod body;
pub mod classify;
pub mod error;
pub mod events;
pub mod fetch;
pub mod generations;
pub mod store;
pub mod strategy;
pub mod telemetry;
pub mod types;
pub mod worker;

// Re-export main types at crate root
pub use error::{Result, VordrError};
pub use worker::{FetchOutcome, Vordr, VordrBuilder, Worker, WorkerState};

pub use classify::{RouteDecision, Routes, Strategy};
pub use events::{Notifier, PushPayload};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use generations::GenerationManager;
pub use store::{CacheStore, Generation, MemoryStore};
pub use strategy::StrategyEngine;
pub use types::{
    AssetManifest, Destination, FetchRequest, Method, RequestKey, ResponseSnapshot, Url,
};
