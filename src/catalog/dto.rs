use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{
    Category, CategoryInput, ProductInput, ProductListing, DEFAULT_CATEGORY_ICON,
    DEFAULT_LARGE_PRICE_ADD,
};
use crate::{
    error::AppError,
    forms::{checked, non_blank, parse_num, required},
    session::Flash,
};

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub meja: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuSection {
    pub category: Category,
    pub items: Vec<ProductListing>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuView {
    pub table_number: Option<String>,
    pub table_number_locked: bool,
    pub sections: Vec<MenuSection>,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub company: BTreeMap<String, String>,
    pub products: Vec<ProductListing>,
}

#[derive(Debug, Serialize)]
pub struct CompanyView {
    pub company: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct AdminProductsView {
    pub products: Vec<ProductListing>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub is_available: bool,
}

#[derive(Debug, Serialize)]
pub struct TableLink {
    pub number: u32,
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodesView {
    pub base_url: String,
    pub tables: Vec<TableLink>,
}

#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub has_temperature_option: Option<String>,
    pub has_sugar_option: Option<String>,
    pub has_size_option: Option<String>,
    pub large_price_add: Option<String>,
}

impl ProductForm {
    pub fn validate(self) -> Result<ProductInput, AppError> {
        let category_id = non_blank(self.category_id)
            .and_then(|s| Uuid::parse_str(&s).ok())
            .ok_or_else(|| AppError::validation("category is required"))?;
        let name = required("name", self.name)?;
        let price: i64 =
            parse_num("price", self.price)?.ok_or_else(|| AppError::validation("price is required"))?;
        if price < 0 {
            return Err(AppError::validation("price must not be negative"));
        }
        let large_price_add = parse_num("large_price_add", self.large_price_add)?
            .unwrap_or(DEFAULT_LARGE_PRICE_ADD);
        if large_price_add < 0 {
            return Err(AppError::validation("large_price_add must not be negative"));
        }
        Ok(ProductInput {
            category_id,
            name,
            price,
            description: non_blank(self.description),
            image: non_blank(self.image),
            has_temperature_option: checked(&self.has_temperature_option),
            has_sugar_option: checked(&self.has_sugar_option),
            has_size_option: checked(&self.has_size_option),
            large_price_add,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<String>,
    pub is_active: Option<String>,
}

impl CategoryForm {
    /// New categories start active; on edit an unchecked box deactivates.
    pub fn validate(self, creating: bool) -> Result<CategoryInput, AppError> {
        let name = required("name", self.name)?;
        Ok(CategoryInput {
            name,
            icon: non_blank(self.icon).unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
            sort_order: parse_num("sort_order", self.sort_order)?.unwrap_or(0),
            is_active: creating || checked(&self.is_active),
        })
    }
}
