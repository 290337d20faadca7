pub mod identity_service;
pub mod metrics_service;
pub mod ownership_service;
