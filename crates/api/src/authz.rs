//! Data-driven approval authorization.
//!
//! Whether a caller may approve an entity is decided by the entity
//! itself, through the [`Approvable`] capability, not by a role table.
//! The check is all-or-nothing over the whole requested set: one entity
//! the caller may not approve rejects the entire request, so a batch
//! approval never partially applies for authorization reasons.

use carte_core::catalog::{Approvable, CatalogEntity};
use carte_core::error::CoreError;
use carte_core::store::CatalogStore;
use carte_core::types::DbId;

/// Authorize `email` to approve every entity in the requested id sets.
///
/// Ids that match no stored entity are not part of the decision; the
/// store's approve pass ignores them anyway. An empty request is
/// trivially authorized.
pub async fn authorize_approval(
    store: &dyn CatalogStore,
    email: &str,
    restaurant_ids: &[DbId],
    menu_item_ids: &[DbId],
) -> Result<(), CoreError> {
    if email.trim().is_empty() {
        return Err(CoreError::Unauthorized(
            "Approval requires an authenticated caller".to_string(),
        ));
    }

    if restaurant_ids.is_empty() && menu_item_ids.is_empty() {
        return Ok(());
    }

    let caller = email.to_lowercase();
    let all = store.get_all().await?;

    for entity in &all {
        let targeted = match entity {
            CatalogEntity::Restaurant(r) => {
                r.id.is_some_and(|id| restaurant_ids.contains(&id))
            }
            CatalogEntity::MenuItem(m) => m.id.is_some_and(|id| menu_item_ids.contains(&id)),
        };
        if !targeted {
            continue;
        }

        let allowed = entity
            .approvers()
            .iter()
            .any(|a| a.to_lowercase() == caller);
        if !allowed {
            tracing::warn!(
                caller = %caller,
                kind = entity.kind(),
                id = ?entity.id(),
                "Approval denied"
            );
            return Err(CoreError::Forbidden(
                "You are not allowed to approve one or more of the requested items".to_string(),
            ));
        }
    }

    Ok(())
}
