//! Two-pass payload parser for bulk catalog onboarding.
//!
//! The payload is an ordered, heterogeneous JSON array of records tagged
//! by a `type` discriminator. Pass one builds every restaurant and a
//! lookup keyed by trimmed external id; pass two builds every menu item,
//! resolving its parent through that lookup. Linking misses are not
//! errors: the item is staged unlinked. Only a structurally malformed
//! payload fails the whole operation.

use std::collections::HashMap;

use serde::Deserialize;

use crate::catalog::{CatalogEntity, MenuItem, Restaurant};
use crate::error::CoreError;
use crate::status::EntityStatus;

/// Discriminator for restaurant records (compared case-insensitively).
pub const RECORD_TYPE_RESTAURANT: &str = "restaurant";

/// Discriminator for menu item records (compared case-insensitively).
pub const RECORD_TYPE_MENU_ITEM: &str = "menuItem";

/// Raw payload record. Unknown fields are ignored; missing optional
/// fields default to empty/zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImportRecord {
    #[serde(rename = "type")]
    record_type: Option<String>,
    id: Option<String>,
    name: Option<String>,
    owner_email_address: Option<String>,
    title: Option<String>,
    price: Option<f64>,
    restaurant_id: Option<String>,
}

impl RawImportRecord {
    fn is_type(&self, wanted: &str) -> bool {
        self.record_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(wanted))
    }
}

/// Parse a payload into linked draft entities, all `Pending`.
///
/// Output order is all restaurants followed by all menu items, not
/// necessarily the original payload order. Records with an unrecognized
/// discriminator are skipped silently.
///
/// Duplicate external ids among restaurants are kept as separate staged
/// entities, but the linking lookup is last-seen-wins, so menu items
/// referencing the duplicated id all resolve to the last restaurant.
pub fn parse_payload(payload: &str) -> Result<Vec<CatalogEntity>, CoreError> {
    let records: Vec<RawImportRecord> = serde_json::from_str(payload)
        .map_err(|e| CoreError::Parse(format!("Malformed import payload: {e}")))?;

    let mut entities = Vec::with_capacity(records.len());
    let mut restaurant_by_external_id: HashMap<String, Restaurant> = HashMap::new();

    // Pass 1: restaurants.
    for raw in records.iter().filter(|r| r.is_type(RECORD_TYPE_RESTAURANT)) {
        let restaurant = Restaurant {
            id: None,
            external_id: raw.id.clone(),
            name: raw.name.clone().unwrap_or_default(),
            owner_email: raw.owner_email_address.clone().unwrap_or_default(),
            status: EntityStatus::Pending,
            image_path: None,
        };

        if let Some(id) = raw.id.as_deref() {
            let trimmed = id.trim();
            if !trimmed.is_empty() {
                if restaurant_by_external_id.contains_key(trimmed) {
                    tracing::warn!(
                        external_id = trimmed,
                        "Duplicate restaurant external id; later record wins for linking"
                    );
                }
                restaurant_by_external_id.insert(trimmed.to_string(), restaurant.clone());
            }
        }

        entities.push(CatalogEntity::Restaurant(restaurant));
    }

    // Pass 2: menu items, linked through the external id lookup.
    for raw in records.iter().filter(|r| r.is_type(RECORD_TYPE_MENU_ITEM)) {
        let parent = raw
            .restaurant_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .and_then(|id| restaurant_by_external_id.get(id))
            .cloned();

        entities.push(CatalogEntity::MenuItem(MenuItem {
            id: None,
            external_id: raw.id.clone(),
            title: raw.title.clone().unwrap_or_default(),
            price: raw.price.unwrap_or(0.0),
            status: EntityStatus::Pending,
            image_path: None,
            restaurant_id: None,
            restaurant: parent,
        }));
    }

    Ok(entities)
}
