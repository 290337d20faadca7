use crate::config::AppConfig;
use crate::index_client::IndexClient;
use crate::services::identity_service::{self, IdentityDirectory};
use crate::services::metrics_service::MetricsAggregator;
use crate::services::ownership_service::OwnershipRepository;
use crate::store::OwnershipStore;
use std::sync::{Arc, OnceLock};

/// Process-wide backend handles. Each slot is assigned at most once by the
/// connection bootstrapper and never replaced afterwards.
#[derive(Clone, Default)]
pub struct Backends {
    store: Arc<OnceLock<Arc<dyn OwnershipStore>>>,
    index_host: Arc<OnceLock<String>>,
}

impl Backends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> Option<Arc<dyn OwnershipStore>> {
        self.store.get().cloned()
    }

    pub fn index_host(&self) -> Option<&str> {
        self.index_host.get().map(String::as_str)
    }

    /// Returns false when a store was already installed.
    pub fn set_store(&self, store: Arc<dyn OwnershipStore>) -> bool {
        self.store.set(store).is_ok()
    }

    pub fn set_index_host(&self, host: String) -> bool {
        self.index_host.set(host).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.store.get().is_some() && self.index_host.get().is_some()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backends: Backends,
    pub ownership: OwnershipRepository,
    pub metrics: MetricsAggregator,
    pub directory: Arc<dyn IdentityDirectory>,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, backends: Backends) -> Self {
        let directory = identity_service::directory_from_config(&config);
        Self::with_directory(config, backends, directory)
    }

    pub fn with_directory(
        config: AppConfig,
        backends: Backends,
        directory: Arc<dyn IdentityDirectory>,
    ) -> Self {
        let ownership = OwnershipRepository::new(backends.clone(), config.store_timeout());
        let metrics = MetricsAggregator::new(backends.clone(), IndexClient::new(&config));
        Self {
            config: Arc::new(config),
            backends,
            ownership,
            metrics,
            directory,
            start_time: chrono::Utc::now(),
        }
    }

    /// Host string handed to the dashboard for direct index links.
    pub fn index_host_for_links(&self) -> String {
        self.backends
            .index_host()
            .map(String::from)
            .or_else(|| self.config.index_hosts.first().cloned())
            .unwrap_or_default()
    }
}
