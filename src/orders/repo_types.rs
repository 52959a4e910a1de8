use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::InvalidStatus;

/// Order status. Any value may follow any other; only membership is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cooking,
    Served,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Cooking,
        OrderStatus::Served,
        OrderStatus::Cancelled,
    ];

    /// Statuses shown on the kitchen display.
    pub const IN_PROGRESS: [OrderStatus; 3] =
        [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Cooking];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Served => "served",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Label used in the staff activity log.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Lunas",
            OrderStatus::Cooking => "Masak",
            OrderStatus::Served => "Antar",
            OrderStatus::Cancelled => "Batal",
        }
    }

    /// Kitchen queue priority; unpaid orders come first. `None` when not in progress.
    pub fn kitchen_rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(1),
            OrderStatus::Paid => Some(2),
            OrderStatus::Cooking => Some(3),
            OrderStatus::Served | OrderStatus::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub table_number: String,
    pub total_price: i64,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub table_number: String,
    pub total_price: i64,
    pub notes: Option<String>,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<OrderRow> for Order {
    type Error = InvalidStatus;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: r.status.parse()?,
            id: r.id,
            order_number: r.order_number,
            customer_name: r.customer_name,
            table_number: r.table_number,
            total_price: r.total_price,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Order line joined with the product's current name and image.
/// `price_at_order` is the snapshot taken from the cart.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub image: String,
    pub qty: i64,
    pub price_at_order: i64,
    pub variant_info: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_name: String,
    pub table_number: String,
    pub total_price: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub qty: i64,
    pub price_at_order: i64,
    pub variant_info: Option<String>,
    pub notes: Option<String>,
}

/// Result of a status write: what it was and what it is now.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub order_id: Uuid,
    pub order_number: String,
    pub old: OrderStatus,
    pub new: OrderStatus,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Half-open `created_at` window `[from, until)`.
    pub created_between: Option<(OffsetDateTime, OffsetDateTime)>,
}

impl OrderFilter {
    /// Window covering one calendar day at the given offset.
    pub fn day_window(day: Date, offset: time::UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
        let start = day.midnight().assume_offset(offset);
        (start, start + time::Duration::days(1))
    }
}
