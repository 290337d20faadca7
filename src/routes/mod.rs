pub mod health;
pub mod hosts;
pub mod repos;
pub mod stats;
pub mod users;

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.max_body_size;

    let api_routes = Router::new()
        .route("/hosts/eshost", get(hosts::index_host))
        .route("/users", get(users::list_users))
        // Ownership
        .route("/repos", get(repos::list_repos))
        .route("/repos/orgs", get(repos::list_orgs))
        .route("/repos/{repo_name}", post(repos::update_ownership))
        // Stats
        .route("/repos/stats", get(stats::list_repo_stats))
        .route("/repos/overview", get(stats::overview))
        .route("/repos/{repo_name}/stats", get(stats::repo_history));

    let ops_routes = Router::new()
        .route("/health", get(health::health))
        .route("/status", get(health::status));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let x_request_id = http::HeaderName::from_static("x-request-id");

    Router::new()
        .merge(ops_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
