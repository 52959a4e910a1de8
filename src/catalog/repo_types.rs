use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Menu item. Prices are in the smallest currency unit.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub image: String,
    pub is_available: bool,
    pub has_temperature_option: bool,
    pub has_sugar_option: bool,
    pub has_size_option: bool,
    pub large_price_add: i64,
}

/// Product joined with its category name, as the menu and admin lists show it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
}

/// Admin input for creating or editing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    /// `None` keeps the current image on update and uses the default on create.
    pub image: Option<String>,
    pub has_temperature_option: bool,
    pub has_sugar_option: bool,
    pub has_size_option: bool,
    pub large_price_add: i64,
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
}

pub const DEFAULT_IMAGE: &str = "default-menu.jpg";
pub const DEFAULT_LARGE_PRICE_ADD: i64 = 5000;
pub const DEFAULT_CATEGORY_ICON: &str = "fa-tag";
