use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::AppConfig;
use crate::index_client::IndexClient;
use crate::state::Backends;
use crate::store;

/// Opens the ownership store and resolves an index host, retrying until both
/// are available.
pub struct Bootstrapper {
    config: Arc<AppConfig>,
    backends: Backends,
    index: IndexClient,
}

impl Bootstrapper {
    pub fn new(config: AppConfig, backends: Backends) -> Self {
        let index = IndexClient::new(&config);
        Self {
            config: Arc::new(config),
            backends,
            index,
        }
    }

    /// Retries on the configured interval. Returns `true` once both backends
    /// are ready, `false` if shutdown was requested first.
    pub async fn ensure_connected(&self, mut shutdown: watch::Receiver<bool>) -> bool {
        let mut ticker = tokio::time::interval(self.config.bootstrap_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    tracing::info!("Bootstrap cancelled by shutdown");
                    return false;
                }
            }

            if self.try_connect_once().await {
                tracing::info!(
                    index_host = self.backends.index_host().unwrap_or_default(),
                    "Backends ready"
                );
                return true;
            }
            tracing::info!(
                retry_in_secs = self.config.bootstrap_interval().as_secs(),
                "Backends not ready, waiting"
            );
        }
    }

    /// One attempt at each missing resource. Resources already acquired are
    /// left alone.
    pub async fn try_connect_once(&self) -> bool {
        if self.backends.store().is_none() {
            self.connect_store().await;
        }
        if self.backends.index_host().is_none() {
            self.resolve_index_host().await;
        }
        self.backends.is_ready()
    }

    async fn connect_store(&self) {
        let location = store::describe(&self.config);
        match store::connect(&self.config).await {
            Ok(handle) => {
                tracing::info!(store = %location, "Store connection opened");
                self.backends.set_store(handle);
            }
            Err(e) => {
                tracing::warn!(store = %location, error = %e, "Could not connect to store");
            }
        }
    }

    async fn resolve_index_host(&self) {
        if self.config.index_hosts.is_empty() {
            tracing::warn!("No index host configured (ES_HOST)");
            return;
        }
        for host in &self.config.index_hosts {
            match self.index.ping(host).await {
                Ok(()) => {
                    tracing::info!(host = %host, "Index host resolved");
                    self.backends.set_index_host(host.clone());
                    return;
                }
                Err(e) => {
                    tracing::warn!(host = %host, error = %e, "Index host not reachable");
                }
            }
        }
    }
}
