//! Durable storage seam for catalog entities.
//!
//! The core workflow consumes exactly three operations: persist a batch
//! (assigning durable identities), fetch everything, and bulk-transition
//! status for a set of ids. `carte-db` provides the PostgreSQL
//! implementation; [`MemoryCatalogStore`] backs tests and local
//! development without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::{CatalogEntity, MenuItem, Restaurant};
use crate::error::CoreError;
use crate::status::EntityStatus;
use crate::types::DbId;

/// Contract over durable entity storage.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a batch atomically, assigning durable ids. External ids
    /// are transient and must not survive persistence. Returns the
    /// persisted entities, parents first.
    async fn save(&self, batch: Vec<CatalogEntity>) -> Result<Vec<CatalogEntity>, CoreError>;

    /// All known entities, with each menu item's parent restaurant
    /// populated so approver resolution works on durable children.
    async fn get_all(&self) -> Result<Vec<CatalogEntity>, CoreError>;

    /// Bulk `Pending -> Approved` transition. Ids already approved or
    /// unknown are left untouched. Returns the number of entities that
    /// actually transitioned.
    async fn approve(
        &self,
        restaurant_ids: &[DbId],
        menu_item_ids: &[DbId],
    ) -> Result<u64, CoreError>;
}

// ── In-memory implementation ─────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryInner {
    restaurants: Vec<Restaurant>,
    menu_items: Vec<MenuItem>,
    next_id: DbId,
}

/// In-memory [`CatalogStore`] mirroring the PostgreSQL semantics.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn save(&self, batch: Vec<CatalogEntity>) -> Result<Vec<CatalogEntity>, CoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");

        let mut saved_restaurants = Vec::new();
        let mut id_by_external: HashMap<String, DbId> = HashMap::new();

        // Parents first, so children can resolve their foreign key.
        for entity in &batch {
            if let CatalogEntity::Restaurant(r) = entity {
                inner.next_id += 1;
                let id = inner.next_id;

                if let Some(ext) = r.external_id.as_deref() {
                    let trimmed = ext.trim();
                    if !trimmed.is_empty() {
                        id_by_external.insert(trimmed.to_string(), id);
                    }
                }

                let mut stored = r.clone();
                stored.id = Some(id);
                stored.external_id = None;
                inner.restaurants.push(stored.clone());
                saved_restaurants.push(stored);
            }
        }

        let mut saved_items = Vec::new();
        for entity in &batch {
            if let CatalogEntity::MenuItem(m) = entity {
                inner.next_id += 1;
                let id = inner.next_id;

                // The in-memory parent link becomes a durable foreign key.
                let restaurant_id = m.restaurant_id.or_else(|| {
                    m.restaurant
                        .as_ref()
                        .and_then(|r| r.external_id.as_deref())
                        .map(str::trim)
                        .and_then(|ext| id_by_external.get(ext).copied())
                });

                let mut stored = m.clone();
                stored.id = Some(id);
                stored.external_id = None;
                stored.restaurant_id = restaurant_id;
                stored.restaurant = None;
                inner.menu_items.push(stored.clone());
                saved_items.push(stored);
            }
        }

        let restaurant_by_id: HashMap<DbId, Restaurant> = inner
            .restaurants
            .iter()
            .filter_map(|r| r.id.map(|id| (id, r.clone())))
            .collect();

        let mut result: Vec<CatalogEntity> = saved_restaurants
            .into_iter()
            .map(CatalogEntity::Restaurant)
            .collect();
        result.extend(saved_items.into_iter().map(|mut m| {
            m.restaurant = m
                .restaurant_id
                .and_then(|id| restaurant_by_id.get(&id).cloned());
            CatalogEntity::MenuItem(m)
        }));

        Ok(result)
    }

    async fn get_all(&self) -> Result<Vec<CatalogEntity>, CoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");

        let restaurant_by_id: HashMap<DbId, Restaurant> = inner
            .restaurants
            .iter()
            .filter_map(|r| r.id.map(|id| (id, r.clone())))
            .collect();

        let mut all: Vec<CatalogEntity> = inner
            .restaurants
            .iter()
            .cloned()
            .map(CatalogEntity::Restaurant)
            .collect();
        all.extend(inner.menu_items.iter().cloned().map(|mut m| {
            m.restaurant = m
                .restaurant_id
                .and_then(|id| restaurant_by_id.get(&id).cloned());
            CatalogEntity::MenuItem(m)
        }));

        Ok(all)
    }

    async fn approve(
        &self,
        restaurant_ids: &[DbId],
        menu_item_ids: &[DbId],
    ) -> Result<u64, CoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let mut transitioned = 0u64;

        for r in inner.restaurants.iter_mut() {
            if r.status == EntityStatus::Pending
                && r.id.is_some_and(|id| restaurant_ids.contains(&id))
            {
                r.status = EntityStatus::Approved;
                transitioned += 1;
            }
        }

        for m in inner.menu_items.iter_mut() {
            if m.status == EntityStatus::Pending
                && m.id.is_some_and(|id| menu_item_ids.contains(&id))
            {
                m.status = EntityStatus::Approved;
                transitioned += 1;
            }
        }

        Ok(transitioned)
    }
}
