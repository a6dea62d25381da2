//! Handlers for the catalog onboarding workflow.
//!
//! Provides endpoints for payload upload (multipart), staged batch
//! retrieval, asset bundle export, and the final commit that turns the
//! staged batch into durable catalog entities.

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use carte_core::catalog::CatalogEntity;
use carte_core::import::parse_payload;

use crate::bundle::{commit_bundle, export_bundle, BUNDLE_DOWNLOAD_NAME};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the JSON payload.
const PAYLOAD_FIELD: &str = "payload";

/// Multipart field carrying the filled-in asset archive.
const ARCHIVE_FIELD: &str = "archive";

/// Typed response for the commit endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub committed: u32,
    pub entities: Vec<CatalogEntity>,
}

// ── Staged batch ─────────────────────────────────────────────────────

/// GET /api/v1/import
///
/// The caller's currently staged batch, parents first. Empty if nothing
/// has been staged or the last commit succeeded.
pub async fn get_staged(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CatalogEntity>>>> {
    let staged = state.staging.get(&auth.scope());
    Ok(Json(DataResponse { data: staged }))
}

/// POST /api/v1/import
///
/// Accept a multipart JSON payload, parse it into linked staged
/// entities, and replace the caller's staged batch wholesale. Nothing is
/// persisted durably; re-uploading is the way to fix a bad payload.
pub async fn upload_payload(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<CatalogEntity>>>)> {
    let mut payload: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(PAYLOAD_FIELD) {
            payload = Some(
                field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            );
        }
    }

    let payload = payload.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field `{PAYLOAD_FIELD}`"))
    })?;

    let batch = parse_payload(&payload)?;

    let scope = auth.scope();
    state.staging.save(&scope, batch.clone());

    tracing::info!(
        scope = %scope,
        staged = batch.len(),
        "Staged import payload"
    );

    Ok((StatusCode::OK, Json(DataResponse { data: batch })))
}

// ── Asset bundle ─────────────────────────────────────────────────────

/// GET /api/v1/import/bundle
///
/// Download the scaffold archive for the caller's staged batch as a zip
/// attachment. The caller replaces the placeholders with real assets and
/// uploads the archive back through the commit endpoint.
pub async fn download_bundle(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let staged = state.staging.get(&auth.scope());
    let archive = export_bundle(&staged, &state.config.placeholder_image)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{BUNDLE_DOWNLOAD_NAME}\""),
            ),
        ],
        archive,
    ))
}

/// POST /api/v1/import/commit
///
/// Accept the filled-in archive as multipart, match its folders to the
/// staged batch, persist everything, and clear staging. Failure leaves
/// the staged batch untouched for retry.
pub async fn commit_import(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<CommitResult>>)> {
    let mut archive: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(ARCHIVE_FIELD) {
            archive = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec(),
            );
        }
    }

    let archive = archive.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field `{ARCHIVE_FIELD}`"))
    })?;

    let scope = auth.scope();
    let entities = commit_bundle(
        state.store.as_ref(),
        &state.staging,
        &scope,
        &archive,
        &state.config.asset_root,
    )
    .await?;

    let result = CommitResult {
        committed: entities.len() as u32,
        entities,
    };

    Ok((StatusCode::OK, Json(DataResponse { data: result })))
}
