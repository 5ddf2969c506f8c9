//! Periodic cleanup of leftover job artifacts and idle per-user state.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::gate::SizeAndRateGate;
use crate::job::JobId;
use crate::metrics;
use crate::scheduler::ConcurrencyScheduler;
use crate::store::PreferenceStore;

use super::workspace::{workspace_prefix, WorkspaceConfig};

/// Removes entries directly under `root` whose modification time is at least
/// `max_age` old, except workspaces of the `live` jobs. A missing root counts
/// as clean.
pub async fn sweep_artifacts(
    root: &Path,
    max_age: Duration,
    live: &[JobId],
) -> std::io::Result<usize> {
    let live_prefixes: Vec<String> = live.iter().map(workspace_prefix).collect();

    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if live_prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())) {
            debug!("Keeping live workspace {}", entry.path().display());
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        let path = entry.path();
        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match result {
            Ok(()) => {
                debug!("Swept stale artifact {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Failed to sweep {}: {}", path.display(), e),
        }
    }

    metrics::ARTIFACTS_SWEPT.inc_by(removed as u64);
    Ok(removed)
}

/// Background task that runs a sweep every `sweep_interval_secs`.
pub struct MaintenanceTask {
    config: WorkspaceConfig,
    gate: Arc<SizeAndRateGate>,
    preferences: Arc<PreferenceStore>,
    scheduler: Option<ConcurrencyScheduler>,
    running: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl MaintenanceTask {
    pub fn new(
        config: WorkspaceConfig,
        gate: Arc<SizeAndRateGate>,
        preferences: Arc<PreferenceStore>,
    ) -> Self {
        Self {
            config,
            gate,
            preferences,
            scheduler: None,
            running: Mutex::new(None),
        }
    }

    /// Never sweep the workspaces of jobs `scheduler` is running.
    pub fn with_scheduler(mut self, scheduler: ConcurrencyScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Runs one maintenance pass now.
    pub async fn run_once(&self) {
        Self::pass(
            &self.config,
            &self.gate,
            &self.preferences,
            self.scheduler.as_ref(),
        )
        .await;
    }

    async fn pass(
        config: &WorkspaceConfig,
        gate: &SizeAndRateGate,
        preferences: &PreferenceStore,
        scheduler: Option<&ConcurrencyScheduler>,
    ) {
        let max_age = Duration::from_secs(config.max_artifact_age_secs);
        let live = match scheduler {
            Some(scheduler) => scheduler.running_jobs().await,
            None => Vec::new(),
        };
        match sweep_artifacts(&config.root_dir, max_age, &live).await {
            Ok(0) => {}
            Ok(n) => info!("Swept {} stale artifacts from {}", n, config.root_dir.display()),
            Err(e) => warn!("Artifact sweep of {} failed: {}", config.root_dir.display(), e),
        }

        let now = Utc::now();
        let windows = gate.evict_idle(now);
        let prefs = preferences.evict_idle(now);
        if windows + prefs > 0 {
            debug!(
                "Evicted {} idle activity windows and {} idle preferences",
                windows, prefs
            );
        }
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Spawns the periodic loop. No-op when already running.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let config = self.config.clone();
        let gate = Arc::clone(&self.gate);
        let preferences = Arc::clone(&self.preferences);
        let scheduler = self.scheduler.clone();
        let period = Duration::from_secs(config.sweep_interval_secs.max(1));

        let handle = tokio::spawn(async move {
            info!("Maintenance loop started (every {}s)", period.as_secs());
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        Self::pass(&config, &gate, &preferences, scheduler.as_ref()).await
                    }
                }
            }
            info!("Maintenance loop stopped");
        });

        *running = Some((cancel, handle));
    }

    /// Stops the loop and waits for it to exit.
    pub async fn stop(&self) {
        let Some((cancel, handle)) = self.running.lock().await.take() else {
            return;
        };
        cancel.cancel();
        if let Err(e) = handle.await {
            warn!("Maintenance loop ended abnormally: {}", e);
        }
    }
}
