use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::models::identity::UserIdentity;
use crate::state::AppState;

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserIdentity>>, AppError> {
    let users = state.directory.list_users().await?;
    Ok(Json(users))
}
