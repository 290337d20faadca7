use axum::extract::State;

use crate::state::AppState;

/// Plain-text index host, used by the dashboard to build direct links.
pub async fn index_host(State(state): State<AppState>) -> String {
    state.index_host_for_links()
}
