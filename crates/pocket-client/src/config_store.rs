//! Holds the backend's reported configuration after the one startup fetch.

use tracing::{info, warn};

use crate::backend::AssistantBackend;
use crate::types::ConfigSnapshot;

/// Label shown while the snapshot is unset, in the shell sidebar.
pub const PROFILE_LOADING_LABEL: &str = "Loading...";

/// Label shown while the snapshot is unset, in the status view.
pub const PROFILE_UNKNOWN_LABEL: &str = "UNKNOWN";

/// Where the store is in its single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// No fetch has finished yet
    #[default]
    NotStarted,
    /// Snapshot fetched and stored
    Loaded,
    /// Fetch failed; the snapshot stays unset
    Failed,
}

/// Read-only holder for the configuration snapshot.
///
/// Consumers should only look at [`ConfigStore::get`]; an unset snapshot
/// means "show the fallback label" whether or not the fetch failed.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    snapshot: Option<ConfigSnapshot>,
    status: LoadStatus,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the snapshot once. Failures are logged and leave it unset.
    pub async fn load(&mut self, backend: &dyn AssistantBackend) {
        match backend.fetch_config().await {
            Ok(snapshot) => {
                info!(
                    backend = backend.name(),
                    profile = %snapshot.profile,
                    routes = snapshot.routing.len(),
                    "backend config loaded"
                );
                self.snapshot = Some(snapshot);
                self.status = LoadStatus::Loaded;
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "failed to fetch backend config");
                self.snapshot = None;
                self.status = LoadStatus::Failed;
            }
        }
    }

    /// Store a snapshot fetched elsewhere (e.g. on a background task).
    pub fn set(&mut self, snapshot: Option<ConfigSnapshot>) {
        self.status = if snapshot.is_some() {
            LoadStatus::Loaded
        } else {
            LoadStatus::Failed
        };
        self.snapshot = snapshot;
    }

    /// The snapshot, or `None` while unset.
    pub fn get(&self) -> Option<&ConfigSnapshot> {
        self.snapshot.as_ref()
    }

    /// Diagnostics only; rendering must not branch on this.
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Profile name, or `fallback` while unset.
    pub fn profile_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.snapshot
            .as_ref()
            .map(|s| s.profile.as_str())
            .unwrap_or(fallback)
    }
}
