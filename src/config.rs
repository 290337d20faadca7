use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Keyspace holding the ownership tables. Also names the store file.
pub const KEYSPACE: &str = "osstracker";
/// Index that receives one stats document per ingestion run.
pub const INDEX_NAME: &str = "osstracker";
pub const DOC_TYPE: &str = "allrepos_stats";

/// Which tabular store the bootstrapper connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// CQL cluster at `CASS_HOST:CASS_PORT`, keyspace `osstracker`.
    Cql,
    /// Local SQLite file under `STORE_DIR`.
    Sqlite,
}

impl StoreBackend {
    /// `STORE_BACKEND` wins when set; otherwise a configured `CASS_HOST`
    /// selects the CQL cluster.
    fn select(explicit: Option<&str>, store_host: &str) -> Self {
        match explicit.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("cql") | Some("cassandra") => StoreBackend::Cql,
            Some("sqlite") => StoreBackend::Sqlite,
            _ if !store_host.is_empty() => StoreBackend::Cql,
            _ => StoreBackend::Sqlite,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub store_backend: StoreBackend,
    pub store_hosts: Vec<String>,
    pub store_port: u16,
    pub store_dir: String,
    pub index_hosts: Vec<String>,
    pub index_port: u16,
    pub bootstrap_interval_secs: u64,
    pub store_timeout_secs: u64,
    pub index_timeout_secs: u64,
    pub directory_url: Option<String>,
    pub max_body_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let store_host = env::var("CASS_HOST").unwrap_or_default();
        let store_backend =
            StoreBackend::select(env::var("STORE_BACKEND").ok().as_deref(), store_host.trim());
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_env("PORT", 3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            store_backend,
            store_hosts: split_hosts(&store_host),
            store_port: parse_env("CASS_PORT", 7104),
            store_dir: env::var("STORE_DIR").unwrap_or_else(|_| "/data".into()),
            index_hosts: env::var("ES_HOST")
                .map(|v| split_hosts(&v))
                .unwrap_or_default(),
            index_port: parse_env("ES_PORT", 7104),
            bootstrap_interval_secs: parse_env("BOOTSTRAP_INTERVAL_SECS", 5),
            store_timeout_secs: parse_env("STORE_TIMEOUT_SECS", 5),
            index_timeout_secs: parse_env("INDEX_TIMEOUT_SECS", 10),
            directory_url: env::var("DIRECTORY_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            max_body_size: parse_env("MAX_BODY_SIZE", 65_536),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store_dir).join(format!("{}.db", KEYSPACE))
    }

    /// Contact points for the CQL cluster as `host:port`.
    pub fn store_contact_points(&self) -> Vec<String> {
        self.store_hosts
            .iter()
            .map(|h| format!("{}:{}", h, self.store_port))
            .collect()
    }

    pub fn bootstrap_interval(&self) -> Duration {
        Duration::from_secs(self.bootstrap_interval_secs.max(1))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn index_timeout(&self) -> Duration {
        Duration::from_secs(self.index_timeout_secs)
    }
}

fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect()
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
