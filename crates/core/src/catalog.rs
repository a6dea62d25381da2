//! Catalog entity model: restaurants and their menu items.
//!
//! Entities move through two lives. While staged, they carry a
//! caller-supplied external correlation id and (for menu items) a direct
//! in-memory link to the parent restaurant. Once committed, they are
//! reborn with a durable id, the external id is dropped, and the parent
//! link becomes a durable foreign key.
//!
//! Who may approve an entity is a property of the entity itself, exposed
//! through the [`Approvable`] capability rather than a role check.

use serde::{Deserialize, Serialize};

use crate::status::EntityStatus;
use crate::types::DbId;

/// Fixed moderator address allowed to approve restaurants.
pub const SITE_ADMIN_EMAIL: &str = "siteadmin@example.com";

/// Prefix for per-entity folders in the asset bundle.
pub const BUNDLE_FOLDER_PREFIX: &str = "item-";

/// Placeholder file dropped into each exported bundle folder.
pub const PLACEHOLDER_FILE_NAME: &str = "default.jpg";

/// Deterministic bundle folder name for an external correlation id.
pub fn bundle_folder_name(external_id: &str) -> String {
    format!("{BUNDLE_FOLDER_PREFIX}{external_id}")
}

// ── Entities ─────────────────────────────────────────────────────────

/// A venue. Parent side of the catalog hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Durable id, assigned at commit. `None` while staged.
    pub id: Option<DbId>,
    /// External correlation id from the payload. Never persisted.
    pub external_id: Option<String>,
    pub name: String,
    pub owner_email: String,
    pub status: EntityStatus,
    /// Durable asset path (e.g. `/images/items/<uuid>.jpg`).
    pub image_path: Option<String>,
}

/// A dish offered by a restaurant. Child side of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Durable id, assigned at commit. `None` while staged.
    pub id: Option<DbId>,
    /// External correlation id from the payload. Never persisted.
    pub external_id: Option<String>,
    pub title: String,
    pub price: f64,
    pub status: EntityStatus,
    /// Durable asset path (e.g. `/images/items/<uuid>.jpg`).
    pub image_path: Option<String>,
    /// Durable foreign key to the parent restaurant, set at commit.
    pub restaurant_id: Option<DbId>,
    /// In-memory parent link, resolved at parse time. A menu item whose
    /// payload parent id matched nothing stays unlinked; that is a valid
    /// staged state (the item is simply unapprovable until linked).
    pub restaurant: Option<Restaurant>,
}

/// A catalog entity of either variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogEntity {
    Restaurant(Restaurant),
    MenuItem(MenuItem),
}

impl CatalogEntity {
    pub fn id(&self) -> Option<DbId> {
        match self {
            Self::Restaurant(r) => r.id,
            Self::MenuItem(m) => m.id,
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        match self {
            Self::Restaurant(r) => r.external_id.as_deref(),
            Self::MenuItem(m) => m.external_id.as_deref(),
        }
    }

    pub fn status(&self) -> EntityStatus {
        match self {
            Self::Restaurant(r) => r.status,
            Self::MenuItem(m) => m.status,
        }
    }

    pub fn set_image_path(&mut self, path: String) {
        match self {
            Self::Restaurant(r) => r.image_path = Some(path),
            Self::MenuItem(m) => m.image_path = Some(path),
        }
    }

    /// Variant name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Restaurant(_) => "restaurant",
            Self::MenuItem(_) => "menuItem",
        }
    }
}

// ── Approval capability ──────────────────────────────────────────────

/// Per-entity, data-driven approval authorization.
///
/// The returned emails are the only callers allowed to move this entity
/// from `Pending` to `Approved`. Callers must compare case-insensitively.
pub trait Approvable {
    fn approvers(&self) -> Vec<String>;
}

impl Approvable for Restaurant {
    // Restaurants are moderated by the site admin.
    fn approvers(&self) -> Vec<String> {
        vec![SITE_ADMIN_EMAIL.to_string()]
    }
}

impl Approvable for MenuItem {
    // Menu items are moderated by the owner of their restaurant. An
    // unlinked item has no approvers and cannot be approved.
    fn approvers(&self) -> Vec<String> {
        match &self.restaurant {
            Some(r) if !r.owner_email.trim().is_empty() => vec![r.owner_email.clone()],
            _ => Vec::new(),
        }
    }
}

impl Approvable for CatalogEntity {
    fn approvers(&self) -> Vec<String> {
        match self {
            Self::Restaurant(r) => r.approvers(),
            Self::MenuItem(m) => m.approvers(),
        }
    }
}
