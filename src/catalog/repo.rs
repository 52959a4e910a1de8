use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Category, CategoryInput, Product, ProductInput, ProductListing, DEFAULT_IMAGE};

const PRODUCT_COLUMNS: &str = "p.id, p.category_id, p.name, p.price, p.description, p.image, \
     p.is_available, p.has_temperature_option, p.has_sugar_option, p.has_size_option, \
     p.large_price_add";

/// Catalog reads used by the customer-facing flows.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_product(&self, id: Uuid) -> anyhow::Result<Option<Product>>;
    async fn active_categories(&self) -> anyhow::Result<Vec<Category>>;
    /// Products of active categories ordered by category sort order, then name.
    async fn menu_products(&self) -> anyhow::Result<Vec<ProductListing>>;
    async fn featured_products(&self, limit: i64) -> anyhow::Result<Vec<ProductListing>>;
    /// `company_info` key/value rows as a map.
    async fn company_info(&self) -> anyhow::Result<BTreeMap<String, String>>;
}

#[derive(Clone)]
pub struct PgCatalogStore {
    db: PgPool,
}

impl PgCatalogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_product(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find product")?;
        Ok(row)
    }

    async fn active_categories(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, icon, sort_order, is_active
              FROM categories
             WHERE is_active
             ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list active categories")?;
        Ok(rows)
    }

    async fn menu_products(&self) -> anyhow::Result<Vec<ProductListing>> {
        let rows = sqlx::query_as::<_, ProductListing>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
              FROM products p
              JOIN categories c ON c.id = p.category_id
             WHERE c.is_active
             ORDER BY c.sort_order, p.name
            "#
        ))
        .fetch_all(&self.db)
        .await
        .context("list menu products")?;
        Ok(rows)
    }

    async fn featured_products(&self, limit: i64) -> anyhow::Result<Vec<ProductListing>> {
        let rows = sqlx::query_as::<_, ProductListing>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
              FROM products p
              JOIN categories c ON c.id = p.category_id
             WHERE p.is_available
             ORDER BY random()
             LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("list featured products")?;
        Ok(rows)
    }

    async fn company_info(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key_name, value FROM company_info")
                .fetch_all(&self.db)
                .await
                .context("load company info")?;
        Ok(rows.into_iter().collect())
    }
}

// ---- admin ----

pub async fn list_all_products(db: &PgPool) -> anyhow::Result<Vec<ProductListing>> {
    let rows = sqlx::query_as::<_, ProductListing>(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}, c.name AS category_name
          FROM products p
          JOIN categories c ON c.id = p.category_id
         ORDER BY c.sort_order, p.name
        "#
    ))
    .fetch_all(db)
    .await
    .context("list products")?;
    Ok(rows)
}

pub async fn list_all_categories(db: &PgPool) -> anyhow::Result<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT id, name, icon, sort_order, is_active FROM categories ORDER BY sort_order, name",
    )
    .fetch_all(db)
    .await
    .context("list categories")?;
    Ok(rows)
}

pub async fn insert_product(db: &PgPool, input: &ProductInput) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO products
            (category_id, name, price, description, image,
             has_temperature_option, has_sugar_option, has_size_option, large_price_add)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(input.category_id)
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.description)
    .bind(input.image.as_deref().unwrap_or(DEFAULT_IMAGE))
    .bind(input.has_temperature_option)
    .bind(input.has_sugar_option)
    .bind(input.has_size_option)
    .bind(input.large_price_add)
    .fetch_one(db)
    .await
    .context("insert product")?;
    Ok(id)
}

pub async fn update_product(db: &PgPool, id: Uuid, input: &ProductInput) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE products
           SET category_id = $2, name = $3, price = $4, description = $5,
               image = COALESCE($6, image),
               has_temperature_option = $7, has_sugar_option = $8, has_size_option = $9,
               large_price_add = $10
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(input.category_id)
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.description)
    .bind(&input.image)
    .bind(input.has_temperature_option)
    .bind(input.has_sugar_option)
    .bind(input.has_size_option)
    .bind(input.large_price_add)
    .execute(db)
    .await
    .context("update product")?;
    Ok(res.rows_affected() > 0)
}

/// Flips availability; returns the new flag, or `None` for an unknown product.
pub async fn toggle_availability(db: &PgPool, id: Uuid) -> anyhow::Result<Option<bool>> {
    let flag = sqlx::query_scalar(
        "UPDATE products SET is_available = NOT is_available WHERE id = $1 RETURNING is_available",
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("toggle product availability")?;
    Ok(flag)
}

pub async fn delete_product(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete product")?;
    Ok(res.rows_affected() > 0)
}

pub async fn insert_category(db: &PgPool, input: &CategoryInput) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO categories (name, icon, sort_order, is_active) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&input.name)
    .bind(&input.icon)
    .bind(input.sort_order)
    .bind(input.is_active)
    .fetch_one(db)
    .await
    .context("insert category")?;
    Ok(id)
}

pub async fn update_category(db: &PgPool, id: Uuid, input: &CategoryInput) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE categories SET name = $2, icon = $3, sort_order = $4, is_active = $5 WHERE id = $1",
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.icon)
    .bind(input.sort_order)
    .bind(input.is_active)
    .execute(db)
    .await
    .context("update category")?;
    Ok(res.rows_affected() > 0)
}
