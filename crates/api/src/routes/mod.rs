pub mod approval;
pub mod health;
pub mod import;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /import            get staged batch, upload payload (multipart)
/// /import/bundle     download asset scaffold (zip)
/// /import/commit     commit staged batch (multipart)
///
/// /approvals         approve restaurants and menu items (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Payload staging and asset bundle round-trip.
        .nest("/import", import::router())
        // Per-entity authorized approval.
        .nest("/approvals", approval::router())
}
