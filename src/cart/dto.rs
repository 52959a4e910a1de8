use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;
use uuid::Uuid;

use super::model::{CartItem, VariantChoice, MAX_LINE_QTY};
use crate::{
    error::AppError,
    forms::{non_blank, parse_num},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    pub product_id: Option<String>,
    pub qty: Option<String>,
    pub temperature: Option<String>,
    pub sugar: Option<String>,
    pub size: Option<String>,
    pub notes: Option<String>,
}

/// Validated add-to-cart request.
#[derive(Debug, Clone)]
pub struct AddToCart {
    /// `None` when the submitted id is not even a UUID; treated as an unknown product.
    pub product_id: Option<Uuid>,
    pub qty: i64,
    pub choice: VariantChoice,
    pub notes: Option<String>,
}

fn qty_too_large() -> AppError {
    AppError::validation(format!("qty must be at most {MAX_LINE_QTY}"))
}

impl TryFrom<AddToCartForm> for AddToCart {
    type Error = AppError;

    fn try_from(f: AddToCartForm) -> Result<Self, AppError> {
        // unparsable or non-positive quantities fall back to one
        let qty = match non_blank(f.qty).map(|s| s.parse::<i64>()) {
            Some(Ok(q)) if q > MAX_LINE_QTY => return Err(qty_too_large()),
            Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => return Err(qty_too_large()),
            Some(Ok(q)) if q > 0 => q,
            _ => 1,
        };
        Ok(Self {
            product_id: non_blank(f.product_id).and_then(|s| Uuid::parse_str(&s).ok()),
            qty,
            choice: VariantChoice {
                temperature: non_blank(f.temperature),
                sugar: non_blank(f.sugar),
                size: non_blank(f.size),
            },
            notes: non_blank(f.notes),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartForm {
    pub item_id: Option<String>,
    pub qty: Option<String>,
}

impl UpdateCartForm {
    pub fn validate(self) -> Result<(u64, i64), AppError> {
        let item_id = parse_item_id(self.item_id)?;
        let qty = parse_num::<i64>("qty", self.qty)?
            .ok_or_else(|| AppError::validation("qty is required"))?;
        if qty > MAX_LINE_QTY {
            return Err(qty_too_large());
        }
        Ok((item_id, qty))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartForm {
    pub item_id: Option<String>,
}

/// Missing or garbled ids match no line.
pub fn parse_item_id(raw: Option<String>) -> Result<u64, AppError> {
    non_blank(raw)
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| AppError::not_found("cart item not found"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub item_count: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartData {
    pub cart: Vec<CartItem>,
    pub total: i64,
    pub item_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart: Vec<CartItem>,
    pub total: i64,
    pub table_number: Option<String>,
}
