//! Lifecycle controller: the worker object the host platform drives.
//!
//! Rather than ambient global event listeners, the worker is an explicit
//! object with `on_install()`, `on_activate()`, and `on_fetch()` methods
//! wired to whatever interception mechanism the host provides. The
//! lifecycle is a small state machine:
//!
//! ```text
//! Idle ──install──► Installing ──ok──► Waiting ──activate──► Activating ──► Active
//!                       │ any asset fails                        │ prune fails
//!                       ▼                                        ▼
//!                 back to prior state                      back to Waiting
//! ```
//!
//! Install is atomic over the precache manifest: snapshots are staged
//! first and committed only when every asset fetched, so a failed attempt
//! never leaves a partial static cache and the previous generation keeps
//! serving. With `skip_waiting` (the default) a successful install rolls
//! straight into activation — freshest static assets take over immediately
//! instead of letting open pages finish on the old generation.

mod builder;

pub use builder::{Vordr, VordrBuilder};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::classify::{RouteDecision, Routes};
use crate::events::EventHandlers;
use crate::fetch::{FetchResponse, Fetcher};
use crate::generations::GenerationManager;
use crate::strategy::StrategyEngine;
use crate::types::{AssetManifest, FetchRequest, RequestKey, Url};
use crate::{Result, VordrError};

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Registered, not yet installed.
    Idle,
    Installing,
    /// Installed; ready to activate.
    Waiting,
    Activating,
    /// Controlling; fetches are intercepted.
    Active,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Idle => "idle",
            WorkerState::Installing => "installing",
            WorkerState::Waiting => "waiting",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
        };
        f.write_str(s)
    }
}

/// What the host should do with an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Serve this response.
    Response(FetchResponse),
    /// Not handled; the host's default fetch applies, untouched.
    PassThrough,
}

impl FetchOutcome {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, FetchOutcome::PassThrough)
    }

    pub fn into_response(self) -> Option<FetchResponse> {
        match self {
            FetchOutcome::Response(response) => Some(response),
            FetchOutcome::PassThrough => None,
        }
    }
}

/// The offline-first fetch worker. Built via [`Vordr::builder`].
pub struct Worker {
    origin: Url,
    manifest: AssetManifest,
    routes: Routes,
    engine: StrategyEngine,
    generations: Arc<GenerationManager>,
    fetcher: Arc<dyn Fetcher>,
    events: EventHandlers,
    skip_waiting: bool,
    state: RwLock<WorkerState>,
    controlling: AtomicBool,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        origin: Url,
        manifest: AssetManifest,
        routes: Routes,
        engine: StrategyEngine,
        generations: Arc<GenerationManager>,
        fetcher: Arc<dyn Fetcher>,
        events: EventHandlers,
        skip_waiting: bool,
    ) -> Self {
        Self {
            origin,
            manifest,
            routes,
            engine,
            generations,
            fetcher,
            events,
            skip_waiting,
            state: RwLock::new(WorkerState::Idle),
            controlling: AtomicBool::new(false),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether this worker has claimed control of open contexts.
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::Acquire)
    }

    /// The generation manager (current names, prune).
    pub fn generations(&self) -> &GenerationManager {
        &self.generations
    }

    /// Install trigger: precache the whole manifest as one atomic batch
    /// and eagerly create the (empty) dynamic generation.
    ///
    /// Repeated installs with an unchanged manifest converge to the same
    /// static generation contents. With `skip_waiting`, a successful
    /// install proceeds straight through activation.
    #[instrument(skip(self))]
    pub async fn on_install(&self) -> Result<()> {
        let prior = self.begin(WorkerState::Installing).await?;
        match self.precache().await {
            Ok(()) => {
                self.set_state(WorkerState::Waiting).await;
                info!(assets = self.manifest.len(), "install complete");
                if self.skip_waiting {
                    self.on_activate().await?;
                }
                Ok(())
            }
            Err(err) => {
                // The previous generation (if any) keeps serving.
                self.set_state(prior).await;
                Err(err)
            }
        }
    }

    /// Activate trigger: prune obsolete generations, then claim control
    /// of open contexts immediately rather than at their next navigation.
    ///
    /// Pruning is awaited before the worker becomes active, so no request
    /// is ever routed to a generation mid-deletion.
    #[instrument(skip(self))]
    pub async fn on_activate(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Waiting {
                return Err(VordrError::Lifecycle {
                    from: state.to_string(),
                    to: WorkerState::Activating.to_string(),
                });
            }
            *state = WorkerState::Activating;
        }

        match self.generations.prune_obsolete().await {
            Ok(removed) => {
                self.controlling.store(true, Ordering::Release);
                self.set_state(WorkerState::Active).await;
                info!(pruned = removed.len(), "activation complete, clients claimed");
                Ok(())
            }
            Err(err) => {
                self.set_state(WorkerState::Waiting).await;
                Err(err)
            }
        }
    }

    /// Fetch trigger: classify, then dispatch to a strategy.
    ///
    /// Passes through when the worker is not active, and for every request
    /// the classifier skips (non-GET, cross-origin).
    pub async fn on_fetch(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        if self.state().await != WorkerState::Active {
            return Ok(FetchOutcome::PassThrough);
        }
        match self.routes.classify(request) {
            RouteDecision::Skip => Ok(FetchOutcome::PassThrough),
            RouteDecision::Handle(strategy) => {
                let response = self.engine.dispatch(strategy, request).await?;
                Ok(FetchOutcome::Response(response))
            }
        }
    }

    /// Push trigger: parse and display. No caching interaction.
    pub fn on_push(&self, raw: &[u8]) -> Result<()> {
        self.events.on_push(raw)
    }

    /// Background-sync trigger.
    pub fn on_sync(&self, tag: &str) {
        self.events.on_sync(tag)
    }

    /// Fetch every manifest asset, then commit. Any single failure fails
    /// the whole install with nothing written.
    async fn precache(&self) -> Result<()> {
        let mut staged = Vec::with_capacity(self.manifest.len());
        for path in self.manifest.iter() {
            let url = self
                .origin
                .join(path)
                .map_err(|e| VordrError::InvalidUrl(e.to_string()))?;
            let request = FetchRequest::get(url.as_str())?;
            let response = self.fetcher.fetch(&request).await.map_err(|err| {
                VordrError::InstallFailed {
                    asset: path.to_string(),
                    reason: err.to_string(),
                }
            })?;
            if !response.ok() {
                return Err(VordrError::InstallFailed {
                    asset: path.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            staged.push((RequestKey::get(&url), response.into_snapshot().await?));
        }

        let generation = self.generations.static_generation().await?;
        for (key, snapshot) in staged {
            generation.put(key, snapshot).await?;
        }
        self.generations.dynamic_generation().await?;
        Ok(())
    }

    /// Enter `next`, rejecting the transition while another one is in
    /// flight. Returns the prior state for rollback on failure.
    async fn begin(&self, next: WorkerState) -> Result<WorkerState> {
        let mut state = self.state.write().await;
        match *state {
            WorkerState::Installing | WorkerState::Activating => Err(VordrError::Lifecycle {
                from: state.to_string(),
                to: next.to_string(),
            }),
            prior => {
                *state = next;
                Ok(prior)
            }
        }
    }

    async fn set_state(&self, next: WorkerState) {
        *self.state.write().await = next;
    }
}
