//! Repository for the catalog tables and the durable store
//! implementation consumed by the onboarding workflow.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use carte_core::catalog::{CatalogEntity, MenuItem, Restaurant};
use carte_core::error::CoreError;
use carte_core::store::CatalogStore;
use carte_core::types::DbId;

use crate::models::catalog::{MenuItemRow, RestaurantRow};

/// Column list for `restaurants`.
const RESTAURANT_COLUMNS: &str =
    "id, name, owner_email, status, image_path, created_at, updated_at";

/// Column list for `menu_items`.
const MENU_ITEM_COLUMNS: &str =
    "id, title, price, status, image_path, restaurant_id, created_at, updated_at";

// ── CatalogRepo ──────────────────────────────────────────────────────

/// Provides the catalog table operations.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Persist a staged batch in one transaction, assigning durable ids.
    ///
    /// Restaurants are inserted first so each menu item's in-memory
    /// parent link can be resolved into a foreign key through the
    /// parent's external correlation id. External ids themselves are
    /// not persisted. Any insert failure rolls the whole batch back.
    pub async fn save_batch(
        pool: &PgPool,
        batch: &[CatalogEntity],
    ) -> Result<Vec<CatalogEntity>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut saved_restaurants: Vec<Restaurant> = Vec::new();
        let mut id_by_external: HashMap<String, DbId> = HashMap::new();

        for entity in batch {
            if let CatalogEntity::Restaurant(r) = entity {
                let sql = format!(
                    "INSERT INTO restaurants (name, owner_email, status, image_path) \
                     VALUES ($1, $2, $3, $4) \
                     RETURNING {RESTAURANT_COLUMNS}"
                );
                let row = sqlx::query_as::<_, RestaurantRow>(&sql)
                    .bind(&r.name)
                    .bind(&r.owner_email)
                    .bind(r.status.as_str())
                    .bind(&r.image_path)
                    .fetch_one(&mut *tx)
                    .await?;

                if let Some(ext) = r.external_id.as_deref() {
                    let trimmed = ext.trim();
                    if !trimmed.is_empty() {
                        id_by_external.insert(trimmed.to_string(), row.id);
                    }
                }

                // Row conversion cannot fail here: status round-trips
                // through the CHECK constraint.
                saved_restaurants.push(
                    Restaurant::try_from(row)
                        .map_err(|e| sqlx::Error::Decode(e.to_string().into()))?,
                );
            }
        }

        let mut saved_items: Vec<MenuItem> = Vec::new();
        for entity in batch {
            if let CatalogEntity::MenuItem(m) = entity {
                let restaurant_id = m.restaurant_id.or_else(|| {
                    m.restaurant
                        .as_ref()
                        .and_then(|r| r.external_id.as_deref())
                        .map(str::trim)
                        .and_then(|ext| id_by_external.get(ext).copied())
                });

                let sql = format!(
                    "INSERT INTO menu_items (title, price, status, image_path, restaurant_id) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING {MENU_ITEM_COLUMNS}"
                );
                let row = sqlx::query_as::<_, MenuItemRow>(&sql)
                    .bind(&m.title)
                    .bind(m.price)
                    .bind(m.status.as_str())
                    .bind(&m.image_path)
                    .bind(restaurant_id)
                    .fetch_one(&mut *tx)
                    .await?;

                saved_items.push(
                    MenuItem::try_from(row)
                        .map_err(|e| sqlx::Error::Decode(e.to_string().into()))?,
                );
            }
        }

        tx.commit().await?;

        tracing::debug!(
            restaurants = saved_restaurants.len(),
            menu_items = saved_items.len(),
            "Batch persisted"
        );

        let restaurant_by_id: HashMap<DbId, Restaurant> = saved_restaurants
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

    /// All restaurants, ordered by id.
    pub async fn list_restaurants(pool: &PgPool) -> Result<Vec<RestaurantRow>, sqlx::Error> {
        let sql = format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants ORDER BY id");
        sqlx::query_as::<_, RestaurantRow>(&sql).fetch_all(pool).await
    }

    /// All menu items, ordered by id.
    pub async fn list_menu_items(pool: &PgPool) -> Result<Vec<MenuItemRow>, sqlx::Error> {
        let sql = format!("SELECT {MENU_ITEM_COLUMNS} FROM menu_items ORDER BY id");
        sqlx::query_as::<_, MenuItemRow>(&sql).fetch_all(pool).await
    }

    /// Bulk `pending -> approved` transition for both entity kinds in
    /// one transaction. The status guard in the WHERE clause makes each
    /// id's read-modify-write atomic; already-approved and unknown ids
    /// are untouched.
    pub async fn approve(
        pool: &PgPool,
        restaurant_ids: &[DbId],
        menu_item_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut transitioned = 0u64;

        if !restaurant_ids.is_empty() {
            let result = sqlx::query(
                "UPDATE restaurants SET status = 'approved', updated_at = now() \
                 WHERE id = ANY($1) AND status = 'pending'",
            )
            .bind(restaurant_ids.to_vec())
            .execute(&mut *tx)
            .await?;
            transitioned += result.rows_affected();
        }

        if !menu_item_ids.is_empty() {
            let result = sqlx::query(
                "UPDATE menu_items SET status = 'approved', updated_at = now() \
                 WHERE id = ANY($1) AND status = 'pending'",
            )
            .bind(menu_item_ids.to_vec())
            .execute(&mut *tx)
            .await?;
            transitioned += result.rows_affected();
        }

        tx.commit().await?;
        Ok(transitioned)
    }
}

// ── PgCatalogStore ───────────────────────────────────────────────────

/// PostgreSQL-backed [`CatalogStore`].
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence(err: sqlx::Error) -> CoreError {
    CoreError::Persistence(err.to_string())
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn save(&self, batch: Vec<CatalogEntity>) -> Result<Vec<CatalogEntity>, CoreError> {
        CatalogRepo::save_batch(&self.pool, &batch)
            .await
            .map_err(persistence)
    }

    async fn get_all(&self) -> Result<Vec<CatalogEntity>, CoreError> {
        let restaurant_rows = CatalogRepo::list_restaurants(&self.pool)
            .await
            .map_err(persistence)?;
        let item_rows = CatalogRepo::list_menu_items(&self.pool)
            .await
            .map_err(persistence)?;

        let restaurants: Vec<Restaurant> = restaurant_rows
            .into_iter()
            .map(Restaurant::try_from)
            .collect::<Result<_, _>>()?;

        let restaurant_by_id: HashMap<DbId, Restaurant> = restaurants
            .iter()
            .filter_map(|r| r.id.map(|id| (id, r.clone())))
            .collect();

        let mut all: Vec<CatalogEntity> = restaurants
            .into_iter()
            .map(CatalogEntity::Restaurant)
            .collect();
        for row in item_rows {
            let mut item = MenuItem::try_from(row)?;
            item.restaurant = item
                .restaurant_id
                .and_then(|id| restaurant_by_id.get(&id).cloned());
            all.push(CatalogEntity::MenuItem(item));
        }

        Ok(all)
    }

    async fn approve(
        &self,
        restaurant_ids: &[DbId],
        menu_item_ids: &[DbId],
    ) -> Result<u64, CoreError> {
        CatalogRepo::approve(&self.pool, restaurant_ids, menu_item_ids)
            .await
            .map_err(persistence)
    }
}
