//! Handlers for the catalog approval workflow.
//!
//! Approval is authorized per entity by the entity's own approver set
//! and applied as a bulk `Pending -> Approved` transition.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use carte_core::types::DbId;

use crate::authz::authorize_approval;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the approval endpoint. Either list may be omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub restaurant_ids: Vec<DbId>,
    #[serde(default)]
    pub menu_item_ids: Vec<DbId>,
}

/// Typed response for the approval endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResult {
    /// Number of entities that actually transitioned to approved.
    pub approved: u64,
}

/// POST /api/v1/approvals
///
/// Approve a set of restaurants and menu items. The caller must be an
/// allowed approver for every requested entity or the whole request is
/// rejected. Entities already approved count as no-ops.
pub async fn approve(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ApproveRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ApprovalResult>>)> {
    authorize_approval(
        state.store.as_ref(),
        &auth.email,
        &input.restaurant_ids,
        &input.menu_item_ids,
    )
    .await?;

    let approved = state
        .store
        .approve(&input.restaurant_ids, &input.menu_item_ids)
        .await?;

    tracing::info!(
        caller = %auth.scope(),
        restaurants = input.restaurant_ids.len(),
        menu_items = input.menu_item_ids.len(),
        approved,
        "Approval applied"
    );

    Ok((
        StatusCode::OK,
        Json(DataResponse {
            data: ApprovalResult { approved },
        }),
    ))
}
