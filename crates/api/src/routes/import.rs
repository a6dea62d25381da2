//! Route definitions for the catalog onboarding workflow.
//!
//! Mounted at `/import`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::import;
use crate::state::AppState;

/// Routes mounted at `/import`.
///
/// ```text
/// GET    /         -> get_staged
/// POST   /         -> upload_payload   (multipart)
/// GET    /bundle   -> download_bundle  (zip attachment)
/// POST   /commit   -> commit_import    (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(import::get_staged).post(import::upload_payload))
        .route("/bundle", get(import::download_bundle))
        .route("/commit", post(import::commit_import))
}
