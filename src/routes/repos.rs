use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};

use crate::error::AppError;
use crate::models::ownership::{Org, RepoOwnership, UpdateOwnershipRequest};
use crate::services::identity_service;
use crate::state::AppState;

/// Accepts the update body as JSON or as a url-encoded form.
pub struct OwnershipUpdate(pub UpdateOwnershipRequest);

impl<S> FromRequest<S> for OwnershipUpdate
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(body) = Json::<UpdateOwnershipRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        } else {
            let Form(body) = Form::<UpdateOwnershipRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        }
    }
}

pub async fn list_repos(State(state): State<AppState>) -> Result<Json<Vec<RepoOwnership>>, AppError> {
    let repos = state.ownership.list_repos().await?;
    Ok(Json(repos))
}

pub async fn list_orgs(State(state): State<AppState>) -> Result<Json<Vec<Org>>, AppError> {
    let orgs = state.ownership.list_orgs().await?;
    Ok(Json(orgs))
}

pub async fn update_ownership(
    State(state): State<AppState>,
    Path(repo_name): Path<String>,
    OwnershipUpdate(req): OwnershipUpdate,
) -> Result<StatusCode, AppError> {
    identity_service::validate_leads(state.directory.as_ref(), &req.dev_lead, &req.mgr_lead)
        .await?;

    let record = req.into_record(repo_name);
    tracing::info!(
        repo = %record.repo_name,
        org = %record.org_short,
        dev_lead = %record.dev_lead_id,
        mgr_lead = %record.mgr_lead_id,
        "Updating repo ownership"
    );
    state.ownership.upsert_ownership(record).await?;

    Ok(StatusCode::OK)
}
