//! Worker lifecycle and the per-strategy fetch interpreter.
//!
//! Install seeds the precache manifest into a staging store and commits it
//! only when every entry succeeded; a partially seeded worker never
//! activates. Activation deletes every store not matching the current
//! version and claims open pages immediately.

use std::sync::Arc;

use biostudio_common::{Result, StudioError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheEntry, CacheStorage};
use crate::clients::Clients;
use crate::config::WorkerConfig;
use crate::fetch::{Fetcher, Request, Response};
use crate::policy::{classify, Strategy};
use crate::push::{ClickOutcome, Notification, PushPayload, ACTION_DISMISS};

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, not yet installed.
    Parsed,
    /// Precache seeding in progress.
    Installing,
    /// Seeded and immediately activatable (waiting is skipped).
    Installed,
    /// Stale store cleanup in progress.
    Activating,
    /// Intercepting requests.
    Running,
    /// Install failed; the worker will never activate.
    Redundant,
}

/// Resolution of an intercepted request.
///
/// Every interception path ends in exactly one of these; failures never
/// propagate to the page as uncaught errors.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the request proceeds untouched.
    PassThrough,
    /// A concrete response, from network or store.
    Respond(Response),
    /// Nothing to serve; the page sees a failed fetch.
    Failed,
}

impl FetchOutcome {
    /// The response, if one was produced.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Respond(response) => Some(response),
            _ => None,
        }
    }
}

/// The offline-capable request cache worker.
pub struct ServiceWorker<F: Fetcher> {
    config: Arc<WorkerConfig>,
    fetcher: F,
    caches: Arc<RwLock<CacheStorage>>,
    clients: Arc<RwLock<Clients>>,
    state: WorkerState,
}

impl<F: Fetcher> ServiceWorker<F> {
    /// Create a worker. It does nothing until installed and activated.
    pub fn new(config: WorkerConfig, fetcher: F) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            caches: Arc::new(RwLock::new(CacheStorage::new())),
            clients: Arc::new(RwLock::new(Clients::new())),
            state: WorkerState::Parsed,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Handle to the cache stores.
    pub fn caches(&self) -> Arc<RwLock<CacheStorage>> {
        Arc::clone(&self.caches)
    }

    /// Handle to the open pages.
    pub fn clients(&self) -> Arc<RwLock<Clients>> {
        Arc::clone(&self.clients)
    }

    /// Install: fetch and store every precache manifest entry.
    ///
    /// Any failure is fatal; the staged store is discarded and the worker
    /// becomes redundant. On success the worker skips waiting and is
    /// immediately activatable.
    pub async fn install(&mut self) -> Result<()> {
        self.state = WorkerState::Installing;
        info!(version = %self.config.cache_version, "Installing service worker");

        match self.seed_precache().await {
            Ok(staged) => {
                let entries = staged.len();
                self.caches.write().await.insert(staged);
                self.state = WorkerState::Installed;
                info!(entries, "Precache seeded, worker activatable");
                Ok(())
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                warn!(error = %e, "Precache seeding failed, install aborted");
                Err(e)
            }
        }
    }

    async fn seed_precache(&self) -> Result<Cache> {
        let mut staged = Cache::new(&self.config.cache_version);
        for entry in &self.config.precache {
            let url = self
                .config
                .resolve(entry)
                .ok_or_else(|| StudioError::config(format!("invalid precache entry: {entry}")))?;
            let request = Request::get(url);
            let response = self.fetcher.fetch(&request).await?;
            if !response.ok() {
                return Err(StudioError::cache(format!(
                    "precache fetch for {} returned {}",
                    request.url, response.status
                )));
            }
            staged.put(&request, CacheEntry::from_response(&request, &response));
        }
        Ok(staged)
    }

    /// Activate: delete stale stores and take control of open pages.
    pub async fn activate(&mut self) -> Result<()> {
        if self.state != WorkerState::Installed {
            return Err(StudioError::state(format!(
                "cannot activate from {:?}",
                self.state
            )));
        }
        self.state = WorkerState::Activating;

        let stale = self
            .caches
            .write()
            .await
            .retain_only(&self.config.cache_version);
        if !stale.is_empty() {
            info!(?stale, "Deleted stale cache stores");
        }

        self.clients.write().await.claim();
        self.state = WorkerState::Running;
        info!(version = %self.config.cache_version, "Service worker active");
        Ok(())
    }

    /// Route an intercepted request.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        if self.state != WorkerState::Running {
            return FetchOutcome::PassThrough;
        }

        let strategy = classify(&self.config, request);
        debug!(url = %request.url, ?strategy, "Routing request");

        match strategy {
            Strategy::PassThrough => FetchOutcome::PassThrough,
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirstWithFallback => self.network_first(request, true).await,
            Strategy::NetworkFirstSilent => self.network_first(request, false).await,
        }
    }

    async fn cache_first(&self, request: &Request) -> FetchOutcome {
        if let Some(response) = self.match_cached(request).await {
            return FetchOutcome::Respond(response);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store(request, &response).await;
                }
                FetchOutcome::Respond(response)
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Asset fetch failed with no cached copy");
                FetchOutcome::Failed
            }
        }
    }

    async fn network_first(&self, request: &Request, offline_fallback: bool) -> FetchOutcome {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store(request, &response).await;
                }
                FetchOutcome::Respond(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network fetch failed, trying cache");
                if let Some(response) = self.match_cached(request).await {
                    return FetchOutcome::Respond(response);
                }
                if offline_fallback {
                    if let Some(response) = self.match_offline_page().await {
                        warn!(url = %request.url, "Serving offline placeholder");
                        return FetchOutcome::Respond(response);
                    }
                }
                FetchOutcome::Failed
            }
        }
    }

    async fn match_cached(&self, request: &Request) -> Option<Response> {
        let caches = self.caches.read().await;
        caches
            .get(&self.config.cache_version)?
            .match_request(request)
            .map(|entry| entry.to_response(request))
    }

    async fn match_offline_page(&self) -> Option<Response> {
        let url = self.config.resolve(&self.config.offline_path)?;
        let request = Request::get(url);
        self.match_cached(&request).await
    }

    async fn store(&self, request: &Request, response: &Response) {
        let entry = CacheEntry::from_response(request, response);
        self.caches
            .write()
            .await
            .open(&self.config.cache_version)
            .put(request, entry);
    }

    /// Turn raw push data into the notification to display.
    pub fn handle_push(&self, data: &[u8]) -> Notification {
        let payload = PushPayload::parse(data);
        debug!(kind = ?payload.kind, "Push message received");
        Notification::from_payload(&self.config, payload)
    }

    /// Handle a click on a displayed notification. The notification is
    /// already closed by the platform; a dismiss action ends there.
    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
        action: Option<&str>,
    ) -> ClickOutcome {
        if action == Some(ACTION_DISMISS) {
            return ClickOutcome::Dismissed;
        }

        let target = &notification.url;
        let mut clients = self.clients.write().await;

        let existing = clients
            .match_all()
            .iter()
            .find(|client| client.url.as_str().contains(target.as_str()))
            .map(|client| client.id.clone());
        if let Some(id) = existing {
            clients.focus(&id);
            debug!(client = %id, url = %target, "Focused existing page");
            return ClickOutcome::Focused(id);
        }

        match self.config.resolve(target) {
            Some(url) => {
                let client = clients.open_window(url.clone());
                debug!(client = %client.id, url = %url, "Opened new page");
                ClickOutcome::Opened(url)
            }
            None => {
                warn!(url = %target, "Notification target did not resolve");
                ClickOutcome::Dismissed
            }
        }
    }
}
