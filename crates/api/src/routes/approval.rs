//! Route definitions for the approval workflow.
//!
//! Mounted at `/approvals`.

use axum::routing::post;
use axum::Router;

use crate::handlers::approval;
use crate::state::AppState;

/// Routes mounted at `/approvals`.
///
/// ```text
/// POST   /   -> approve
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(approval::approve))
}
