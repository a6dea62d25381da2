//! Row models for the catalog tables and conversions into the domain
//! entities. External correlation ids never appear here; they are
//! transient to the staging workflow.

use sqlx::FromRow;

use carte_core::catalog::{MenuItem, Restaurant};
use carte_core::error::CoreError;
use carte_core::status::EntityStatus;
use carte_core::types::{DbId, Timestamp};

/// A row from the `restaurants` table.
#[derive(Debug, Clone, FromRow)]
pub struct RestaurantRow {
    pub id: DbId,
    pub name: String,
    pub owner_email: String,
    pub status: String,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `menu_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct MenuItemRow {
    pub id: DbId,
    pub title: String,
    pub price: f64,
    pub status: String,
    pub image_path: Option<String>,
    pub restaurant_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = CoreError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        Ok(Restaurant {
            id: Some(row.id),
            external_id: None,
            name: row.name,
            owner_email: row.owner_email,
            status: EntityStatus::parse(&row.status)?,
            image_path: row.image_path,
        })
    }
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = CoreError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        Ok(MenuItem {
            id: Some(row.id),
            external_id: None,
            title: row.title,
            price: row.price,
            status: EntityStatus::parse(&row.status)?,
            image_path: row.image_path,
            restaurant_id: row.restaurant_id,
            // Populated by the repository from the parent join.
            restaurant: None,
        })
    }
}
