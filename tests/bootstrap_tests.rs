mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use osstracker_console::background::connection_bootstrap::Bootstrapper;
use osstracker_console::config::StoreBackend;
use osstracker_console::error::AppError;
use osstracker_console::models::ownership::RepoOwnership;
use osstracker_console::services::ownership_service::OwnershipRepository;
use osstracker_console::state::Backends;
use osstracker_console::store::{OwnershipStore, SqliteStore};
use tokio::sync::watch;

fn record(repo: &str, org: &str, dev: &str, mgr: &str) -> RepoOwnership {
    RepoOwnership {
        repo_name: repo.to_string(),
        org_short: org.to_string(),
        dev_lead_id: dev.to_string(),
        mgr_lead_id: mgr.to_string(),
    }
}

// ==================== Bootstrapper Tests ====================

#[tokio::test]
async fn test_bootstrap_ready_when_both_backends_answer() {
    let tmp = tempfile::tempdir().unwrap();
    let (_index, port) = FakeIndex::spawn().await;
    let config = test_config(tmp.path().to_str().unwrap(), port);
    let backends = Backends::new();

    let bootstrapper = Bootstrapper::new(config.clone(), backends.clone());
    assert!(bootstrapper.try_connect_once().await);
    assert!(backends.is_ready());
    assert_eq!(backends.index_host(), Some("127.0.0.1"));
    assert!(config.store_path().exists());
}

#[tokio::test]
async fn test_bootstrap_retry_keeps_acquired_store() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path().to_str().unwrap(), closed_port().await);
    let backends = Backends::new();
    let bootstrapper = Bootstrapper::new(config, backends.clone());

    assert!(!bootstrapper.try_connect_once().await);
    let first = backends.store().expect("store should be open");
    assert!(backends.index_host().is_none());

    assert!(!bootstrapper.try_connect_once().await);
    let second = backends.store().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_bootstrap_picks_first_reachable_host() {
    let tmp = tempfile::tempdir().unwrap();
    let (_index, port) = FakeIndex::spawn().await;
    let mut config = test_config(tmp.path().to_str().unwrap(), port);
    // Nothing listens on this loopback alias at the fake index port
    config.index_hosts = vec!["127.0.0.2".to_string(), "127.0.0.1".to_string()];
    config.index_timeout_secs = 2;
    let backends = Backends::new();

    let bootstrapper = Bootstrapper::new(config, backends.clone());
    assert!(bootstrapper.try_connect_once().await);
    assert_eq!(backends.index_host(), Some("127.0.0.1"));
}

#[tokio::test]
async fn test_bootstrap_without_index_hosts_never_ready() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = test_config(tmp.path().to_str().unwrap(), 9200);
    config.index_hosts.clear();
    let backends = Backends::new();

    let bootstrapper = Bootstrapper::new(config, backends.clone());
    assert!(!bootstrapper.try_connect_once().await);
    assert!(backends.store().is_some());
    assert!(!backends.is_ready());
}

#[tokio::test]
async fn test_bootstrap_cql_store_unreachable_leaves_slot_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let (_index, port) = FakeIndex::spawn().await;
    let mut config = test_config(tmp.path().to_str().unwrap(), port);
    config.store_backend = StoreBackend::Cql;
    config.store_hosts = vec!["127.0.0.1".to_string()];
    config.store_port = closed_port().await;
    config.store_timeout_secs = 2;
    let backends = Backends::new();

    let bootstrapper = Bootstrapper::new(config.clone(), backends.clone());
    let connected = tokio::time::timeout(Duration::from_secs(10), bootstrapper.try_connect_once())
        .await
        .expect("cql connect hung");
    assert!(!connected);
    assert!(backends.store().is_none());
    assert_eq!(backends.index_host(), Some("127.0.0.1"));
    // The CQL backend never touches the local store file
    assert!(!config.store_path().exists());
}

#[tokio::test]
async fn test_ensure_connected_returns_when_ready() {
    let tmp = tempfile::tempdir().unwrap();
    let (_index, port) = FakeIndex::spawn().await;
    let config = test_config(tmp.path().to_str().unwrap(), port);
    let backends = Backends::new();
    let bootstrapper = Bootstrapper::new(config, backends.clone());
    let (_tx, rx) = watch::channel(false);

    let ready = tokio::time::timeout(Duration::from_secs(5), bootstrapper.ensure_connected(rx))
        .await
        .expect("bootstrap did not finish");
    assert!(ready);
    assert!(backends.is_ready());
}

#[tokio::test]
async fn test_ensure_connected_stops_on_shutdown() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path().to_str().unwrap(), closed_port().await);
    let backends = Backends::new();
    let bootstrapper = Bootstrapper::new(config, backends.clone());
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(async move { bootstrapper.ensure_connected(rx).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(true).unwrap();

    let ready = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("bootstrap ignored shutdown")
        .unwrap();
    assert!(!ready);
    assert!(!backends.is_ready());
}

#[tokio::test]
async fn test_backend_slots_are_write_once() {
    let backends = Backends::new();
    assert!(backends.set_index_host("es-a".to_string()));
    assert!(!backends.set_index_host("es-b".to_string()));
    assert_eq!(backends.index_host(), Some("es-a"));
}

// ==================== Ownership Repository Tests ====================

#[tokio::test]
async fn test_repository_without_store_fails_fast() {
    let repo = OwnershipRepository::new(Backends::new(), Duration::from_secs(1));

    let result = tokio::time::timeout(Duration::from_secs(2), repo.list_repos())
        .await
        .expect("list_repos hung");
    assert!(matches!(result, Err(AppError::StoreUnavailable(_))));

    let result = repo.list_orgs().await;
    assert!(matches!(result, Err(AppError::StoreUnavailable(_))));

    let result = repo
        .upsert_ownership(record("foo", "X", "1", "2"))
        .await;
    assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
}

#[tokio::test]
async fn test_repository_last_write_wins() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&tmp.path().join("osstracker.db"), Duration::from_secs(5))
        .await
        .unwrap();
    let backends = Backends::new();
    backends.set_store(Arc::new(store));
    let repo = OwnershipRepository::new(backends, Duration::from_secs(5));

    repo.upsert_ownership(record("foo", "X", "1", "2")).await.unwrap();
    repo.upsert_ownership(record("bar", "Y", "3", "4")).await.unwrap();
    repo.upsert_ownership(record("foo", "Z", "5", "6")).await.unwrap();

    let mut repos = repo.list_repos().await.unwrap();
    repos.sort_by(|a, b| a.repo_name.cmp(&b.repo_name));
    assert_eq!(
        repos,
        vec![record("bar", "Y", "3", "4"), record("foo", "Z", "5", "6")]
    );
}

#[tokio::test]
async fn test_store_reopen_keeps_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("osstracker.db");

    let store = SqliteStore::open(&path, Duration::from_secs(5)).await.unwrap();
    store.upsert_repo(record("foo", "X", "1", "2")).await.unwrap();
    drop(store);

    let reopened = SqliteStore::open(&path, Duration::from_secs(5)).await.unwrap();
    assert_eq!(
        reopened.select_repos().await.unwrap(),
        vec![record("foo", "X", "1", "2")]
    );
    assert!(reopened.select_orgs().await.unwrap().is_empty());
}
