//! Asset bundle engine: scaffold export and the matching commit.
//!
//! Export builds a zip with one folder per staged entity, named
//! `item-<external id>` (or a generated id when the entity has none),
//! each holding a single placeholder file. The caller fills the folders
//! with real assets and uploads the archive back; commit extracts it,
//! matches folders to staged entities by the same deterministic naming,
//! copies each matched asset under the durable asset root, persists the
//! whole batch in one call, and clears staging.
//!
//! All temporary filesystem trees are [`tempfile::TempDir`]s, so they
//! are deleted on every exit path, success or failure.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::Path;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use carte_core::catalog::{bundle_folder_name, CatalogEntity, PLACEHOLDER_FILE_NAME};
use carte_core::error::CoreError;
use carte_core::staging::StagingStore;
use carte_core::store::CatalogStore;

/// Download filename for the exported bundle.
pub const BUNDLE_DOWNLOAD_NAME: &str = "items-images.zip";

/// Public URL prefix recorded for committed assets.
const ASSET_URL_PREFIX: &str = "/images/items";

fn internal(context: &str, err: std::io::Error) -> CoreError {
    CoreError::Internal(format!("{context}: {err}"))
}

// ── Export ───────────────────────────────────────────────────────────

/// Build the scaffold archive for a staged batch.
///
/// Fails with [`CoreError::NotFound`] if the placeholder source asset is
/// missing; no partial archive is produced.
pub fn export_bundle(items: &[CatalogEntity], placeholder: &Path) -> Result<Vec<u8>, CoreError> {
    if !placeholder.is_file() {
        return Err(CoreError::NotFound(format!(
            "Placeholder image not found at {}",
            placeholder.display()
        )));
    }

    let temp_root = TempDir::new().map_err(|e| internal("Failed to create export root", e))?;

    // Duplicate external ids collapse into one folder, matching the
    // ambiguity the parser already allows for linking.
    let mut folder_names: BTreeSet<String> = BTreeSet::new();

    for item in items {
        let folder_name = match item.external_id() {
            Some(id) => bundle_folder_name(id),
            None => bundle_folder_name(&uuid::Uuid::new_v4().to_string()),
        };

        let item_folder = temp_root.path().join(&folder_name);
        std::fs::create_dir_all(&item_folder)
            .map_err(|e| internal("Failed to create item folder", e))?;
        std::fs::copy(placeholder, item_folder.join(PLACEHOLDER_FILE_NAME))
            .map_err(|e| internal("Failed to copy placeholder", e))?;

        folder_names.insert(folder_name);
    }

    let mut archive = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut archive));
        let options = SimpleFileOptions::default();

        for folder_name in &folder_names {
            zip.add_directory(format!("{folder_name}/"), options)
                .map_err(|e| CoreError::Internal(format!("Failed to add folder to zip: {e}")))?;

            let placeholder_bytes =
                std::fs::read(temp_root.path().join(folder_name).join(PLACEHOLDER_FILE_NAME))
                    .map_err(|e| internal("Failed to read placeholder copy", e))?;
            zip.start_file(format!("{folder_name}/{PLACEHOLDER_FILE_NAME}"), options)
                .map_err(|e| CoreError::Internal(format!("Failed to add file to zip: {e}")))?;
            zip.write_all(&placeholder_bytes)
                .map_err(|e| internal("Failed to write zip entry", e))?;
        }

        zip.finish()
            .map_err(|e| CoreError::Internal(format!("Failed to finalize zip: {e}")))?;
    }

    tracing::info!(
        entities = items.len(),
        folders = folder_names.len(),
        "Exported asset bundle scaffold"
    );

    Ok(archive)
}

// ── Commit ───────────────────────────────────────────────────────────

/// Match an uploaded archive against the caller's staged batch, persist
/// the batch durably, and clear staging.
///
/// Per-entity matching misses are absorbed: an entity with no external
/// id, or whose folder is missing or empty, is simply committed without
/// an asset. Extraction or persistence failure aborts the whole commit
/// with staging left exactly as before, so the caller can retry without
/// re-uploading the payload.
pub async fn commit_bundle(
    store: &dyn CatalogStore,
    staging: &StagingStore,
    scope: &str,
    archive: &[u8],
    asset_root: &Path,
) -> Result<Vec<CatalogEntity>, CoreError> {
    let mut batch = staging.get(scope);
    if batch.is_empty() {
        return Err(CoreError::Validation(
            "No staged items to commit. Upload a payload first.".to_string(),
        ));
    }

    if archive.is_empty() {
        return Err(CoreError::Validation(
            "Please upload the images archive.".to_string(),
        ));
    }

    let temp_root = TempDir::new().map_err(|e| internal("Failed to create extraction root", e))?;
    let extract_dir = temp_root.path().join("extracted");
    std::fs::create_dir_all(&extract_dir)
        .map_err(|e| internal("Failed to create extraction folder", e))?;

    let mut zip = ZipArchive::new(Cursor::new(archive))
        .map_err(|e| CoreError::Validation(format!("Could not read the uploaded archive: {e}")))?;
    zip.extract(&extract_dir)
        .map_err(|e| CoreError::Validation(format!("Could not extract the uploaded archive: {e}")))?;

    std::fs::create_dir_all(asset_root)
        .map_err(|e| internal("Failed to create asset root", e))?;

    let mut matched = 0usize;
    for entity in batch.iter_mut() {
        let Some(external_id) = entity.external_id() else {
            continue;
        };
        if external_id.trim().is_empty() {
            continue;
        }

        let item_folder = extract_dir.join(bundle_folder_name(external_id));
        if !item_folder.is_dir() {
            continue;
        }

        let Some(source) = first_file_in(&item_folder)? else {
            continue;
        };

        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let file_name = format!("{}{extension}", uuid::Uuid::new_v4());
        std::fs::copy(&source, asset_root.join(&file_name))
            .map_err(|e| internal("Failed to copy asset", e))?;

        entity.set_image_path(format!("{ASSET_URL_PREFIX}/{file_name}"));
        matched += 1;
    }

    // One persistence call is the atomicity boundary: staging is only
    // cleared once the store reports success.
    let saved = store.save(batch).await?;
    staging.clear(scope);

    tracing::info!(
        scope = %scope,
        committed = saved.len(),
        with_assets = matched,
        "Committed staged batch"
    );

    Ok(saved)
}

/// First regular file in a folder, by lexicographic file name. The
/// ordering is pinned so matching is reproducible across filesystems.
fn first_file_in(folder: &Path) -> Result<Option<std::path::PathBuf>, CoreError> {
    let mut files: Vec<std::path::PathBuf> = Vec::new();
    let entries =
        std::fs::read_dir(folder).map_err(|e| internal("Failed to read item folder", e))?;
    for entry in entries {
        let entry = entry.map_err(|e| internal("Failed to read folder entry", e))?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files.into_iter().next())
}
