use std::{sync::Arc, time::Duration};

use shared::{config::NodeConfig, domain::NodeStatus, protocol::NodeEvent};
use thiserror::Error;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod cache;
pub mod dispatch;
pub mod proxy;
pub mod timefmt;

pub use cache::DomainCache;
pub use proxy::{MissingNodeProxy, NodeProxy};

/// Settling interval the remote module needs after a successful start before
/// it can answer data requests.
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Failures surfaced by the controller's lifecycle operations. Gating
/// failures during `start()` and rejected `stop()` calls also leave the
/// controller status at `Error`; there is no automatic retry.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("start requested while controller is {status:?}")]
    StartWhileActive { status: NodeStatus },
    #[error("node module rejected initialize: {source}")]
    Initialize { source: anyhow::Error },
    #[error("node module rejected event callback registration: {source}")]
    RegisterCallback { source: anyhow::Error },
    #[error("node module rejected start: {source}")]
    Start { source: anyhow::Error },
    #[error("node module rejected stop: {source}")]
    Stop { source: anyhow::Error },
    #[error("node module rejected {request} request: {source}")]
    Refresh {
        request: &'static str,
        source: anyhow::Error,
    },
}

/// Change notification for one observable value. Emitted exactly once per
/// actual change; re-setting an unchanged value stays silent.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StatusChanged(NodeStatus),
    PeersChanged(Vec<String>),
    MetricsChanged(String),
    PeersLastUpdatedChanged(String),
    MetricsLastUpdatedChanged(String),
}

struct ControllerState {
    status: NodeStatus,
    cache: DomainCache,
    event_task: Option<JoinHandle<()>>,
    settle_task: Option<JoinHandle<()>>,
}

/// Client-side controller for a remotely-hosted p2p node module. Owns the
/// authoritative lifecycle status and a cached view of the module's peer
/// roster and metrics, kept in sync from asynchronously delivered events.
/// The proxy is injected at construction and the controller's lifetime is
/// its own, not process-wide.
pub struct NodeController {
    proxy: Arc<dyn NodeProxy>,
    config: NodeConfig,
    settle_delay: Duration,
    inner: Mutex<ControllerState>,
    changes: broadcast::Sender<ControllerEvent>,
}

impl NodeController {
    pub fn new(proxy: Arc<dyn NodeProxy>, config: NodeConfig) -> Arc<Self> {
        Self::new_with_settle_delay(proxy, config, DEFAULT_SETTLE_DELAY)
    }

    pub fn new_with_settle_delay(
        proxy: Arc<dyn NodeProxy>,
        config: NodeConfig,
        settle_delay: Duration,
    ) -> Arc<Self> {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Arc::new(Self {
            proxy,
            config,
            settle_delay,
            inner: Mutex::new(ControllerState {
                status: NodeStatus::NotStarted,
                cache: DomainCache::default(),
                event_task: None,
                settle_task: None,
            }),
            changes,
        })
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<ControllerEvent> {
        self.changes.subscribe()
    }

    pub async fn status(&self) -> NodeStatus {
        self.inner.lock().await.status
    }

    pub async fn peers(&self) -> Vec<String> {
        self.inner.lock().await.cache.peers().to_vec()
    }

    pub async fn metrics(&self) -> String {
        self.inner.lock().await.cache.metrics().to_string()
    }

    pub async fn peers_last_updated(&self) -> String {
        self.inner.lock().await.cache.peers_last_updated().to_string()
    }

    pub async fn metrics_last_updated(&self) -> String {
        self.inner.lock().await.cache.metrics_last_updated().to_string()
    }

    /// Drives the node module through its start protocol: initialize, arm
    /// the event callback, subscribe to the consumed events, then start.
    /// Each gating step must succeed before the next runs; the first
    /// rejection leaves the controller in `Error` and aborts the remainder.
    /// Event subscriptions are best-effort and do not gate the sequence.
    pub async fn start(self: &Arc<Self>) -> Result<(), ControlError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.status.is_active() || inner.status == NodeStatus::Stopping {
                return Err(ControlError::StartWhileActive {
                    status: inner.status,
                });
            }
            self.transition(&mut inner, NodeStatus::Starting);
        }

        if let Err(source) = self.proxy.initialize(&self.config).await {
            self.set_status(NodeStatus::Error).await;
            return Err(ControlError::Initialize { source });
        }

        if let Err(source) = self.proxy.register_event_callback().await {
            self.set_status(NodeStatus::Error).await;
            return Err(ControlError::RegisterCallback { source });
        }

        {
            let mut inner = self.inner.lock().await;
            if let Some(task) = inner.event_task.take() {
                task.abort();
            }
            inner.event_task = Some(self.spawn_event_pump());
        }

        for name in dispatch::CONSUMED_EVENTS {
            if let Err(err) = self.proxy.subscribe(name).await {
                warn!(event = name, error = %err, "event subscription failed; continuing without it");
            }
        }

        if let Err(source) = self.proxy.start().await {
            self.set_status(NodeStatus::Error).await;
            return Err(ControlError::Start { source });
        }

        let mut inner = self.inner.lock().await;
        self.transition(&mut inner, NodeStatus::Running);
        if let Some(task) = inner.settle_task.take() {
            task.abort();
        }
        inner.settle_task = Some(self.spawn_settle_refresh());
        info!("node module running");
        Ok(())
    }

    /// Stops the node module. A no-op unless the controller is `Running` or
    /// `Starting`; no proxy call is issued otherwise. On success the cached
    /// view is cleared; on rejection the prior cache is left intact so the
    /// last-known data stays visible alongside the `Error` status.
    pub async fn stop(&self) -> Result<(), ControlError> {
        {
            let mut inner = self.inner.lock().await;
            if !inner.status.is_active() {
                debug!(status = ?inner.status, "stop ignored outside an active state");
                return Ok(());
            }
            // A pending settle refresh must not fire against a stopped
            // module on a stale `Running` assumption.
            if let Some(task) = inner.settle_task.take() {
                task.abort();
            }
            self.transition(&mut inner, NodeStatus::Stopping);
        }

        if let Err(source) = self.proxy.stop().await {
            self.set_status(NodeStatus::Error).await;
            return Err(ControlError::Stop { source });
        }

        let mut inner = self.inner.lock().await;
        self.transition(&mut inner, NodeStatus::Stopped);
        if inner.cache.set_peers(Vec::new()) {
            let _ = self.changes.send(ControllerEvent::PeersChanged(Vec::new()));
        }
        if inner.cache.set_metrics(String::new()) {
            let _ = self
                .changes
                .send(ControllerEvent::MetricsChanged(String::new()));
        }
        info!("node module stopped");
        Ok(())
    }

    /// Asks the node module for its current peer roster. A no-op unless
    /// `Running`. The reply arrives later as a `connectedPeersResponse`
    /// event, never as a return value; a rejected request leaves the status
    /// untouched.
    pub async fn refresh_peers(&self) -> Result<(), ControlError> {
        if !self.is_running().await {
            debug!("peer refresh ignored while not running");
            return Ok(());
        }
        self.proxy
            .request_peers()
            .await
            .map_err(|source| ControlError::Refresh {
                request: "peers",
                source,
            })
    }

    /// Asks the node module for its current metrics snapshot. Same contract
    /// as [`Self::refresh_peers`].
    pub async fn refresh_metrics(&self) -> Result<(), ControlError> {
        if !self.is_running().await {
            debug!("metrics refresh ignored while not running");
            return Ok(());
        }
        self.proxy
            .request_metrics()
            .await
            .map_err(|source| ControlError::Refresh {
                request: "metrics",
                source,
            })
    }

    /// Applies one asynchronously delivered node event to the cached view.
    /// Unknown events and malformed payloads are ignored. Updates are only
    /// accepted while the controller is `Running`, so a response arriving
    /// after `stop()` cannot repopulate the cleared cache.
    pub async fn handle_event(&self, event: NodeEvent) {
        let Some(update) = dispatch::route(&event) else {
            return;
        };

        let mut inner = self.inner.lock().await;
        if inner.status != NodeStatus::Running {
            debug!(event = %event.name, status = ?inner.status, "dropping event outside running state");
            return;
        }

        match update {
            dispatch::CacheUpdate::Peers { roster, updated_at } => {
                if inner.cache.set_peers(roster) {
                    debug!(count = inner.cache.peers().len(), "peer roster updated");
                    let _ = self
                        .changes
                        .send(ControllerEvent::PeersChanged(inner.cache.peers().to_vec()));
                }
                if let Some(timestamp) = updated_at {
                    if inner.cache.set_peers_last_updated(timestamp) {
                        let _ = self.changes.send(ControllerEvent::PeersLastUpdatedChanged(
                            inner.cache.peers_last_updated().to_string(),
                        ));
                    }
                }
            }
            dispatch::CacheUpdate::Metrics {
                rendered,
                updated_at,
            } => {
                if inner.cache.set_metrics(rendered) {
                    debug!("metrics updated");
                    let _ = self.changes.send(ControllerEvent::MetricsChanged(
                        inner.cache.metrics().to_string(),
                    ));
                }
                if let Some(timestamp) = updated_at {
                    if inner.cache.set_metrics_last_updated(timestamp) {
                        let _ = self.changes.send(ControllerEvent::MetricsLastUpdatedChanged(
                            inner.cache.metrics_last_updated().to_string(),
                        ));
                    }
                }
            }
        }
    }

    async fn is_running(&self) -> bool {
        self.inner.lock().await.status == NodeStatus::Running
    }

    async fn set_status(&self, next: NodeStatus) {
        let mut inner = self.inner.lock().await;
        self.transition(&mut inner, next);
    }

    fn transition(&self, inner: &mut ControllerState, next: NodeStatus) {
        if inner.status == next {
            return;
        }
        inner.status = next;
        debug!(status = ?next, "status changed");
        let _ = self.changes.send(ControllerEvent::StatusChanged(next));

        // Entering an idle state invalidates both freshness stamps.
        if matches!(next, NodeStatus::NotStarted | NodeStatus::Stopped) {
            if inner.cache.set_peers_last_updated(String::new()) {
                let _ = self
                    .changes
                    .send(ControllerEvent::PeersLastUpdatedChanged(String::new()));
            }
            if inner.cache.set_metrics_last_updated(String::new()) {
                let _ = self
                    .changes
                    .send(ControllerEvent::MetricsLastUpdatedChanged(String::new()));
            }
        }
    }

    fn spawn_event_pump(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.proxy.subscribe_events();
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                controller.handle_event(event).await;
            }
        })
    }

    fn spawn_settle_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let delay = self.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = controller.refresh_peers().await {
                warn!(error = %err, "initial peer refresh failed");
            }
            if let Err(err) = controller.refresh_metrics().await {
                warn!(error = %err, "initial metrics refresh failed");
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
