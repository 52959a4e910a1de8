use serde::{Deserialize, Serialize};

use super::repo_types::{Order, OrderFilter, OrderStatus, OrderWithItems};
use crate::{
    cart::model::CartItem,
    error::AppError,
    forms::{non_blank, parse_date},
    session::Flash,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderForm {
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: String,
    pub customer_name: String,
    pub table_number: String,
    pub total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub cart: Vec<CartItem>,
    pub total: i64,
    pub table_number: String,
    pub table_number_locked: bool,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct TrackView {
    #[serde(flatten)]
    pub order: OrderWithItems,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
}

impl OrderListQuery {
    /// Blank or `all` status means no status filter.
    pub fn validate(self, offset: time::UtcOffset) -> Result<OrderFilter, AppError> {
        let status = match non_blank(self.status) {
            None => None,
            Some(s) if s == "all" => None,
            Some(s) => Some(
                s.parse::<OrderStatus>()
                    .map_err(|_| AppError::validation("invalid status"))?,
            ),
        };
        let created_between = parse_date("date", self.date)?.map(|d| OrderFilter::day_window(d, offset));
        Ok(OrderFilter {
            status,
            created_between,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListView {
    pub orders: Vec<Order>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub active_orders: usize,
    pub pending_reservations: i64,
    pub flashes: Vec<Flash>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, UtcOffset};

    #[test]
    fn list_query_filters() {
        let offset = UtcOffset::from_hms(7, 0, 0).unwrap();
        let f = OrderListQuery {
            status: Some("all".into()),
            date: Some("2026-10-16".into()),
        }
        .validate(offset)
        .unwrap();
        assert_eq!(f.status, None);
        let (from, until) = f.created_between.unwrap();
        assert_eq!(from.date(), date!(2026 - 10 - 16));
        assert_eq!(from.offset(), offset);
        assert_eq!(until - from, time::Duration::days(1));

        let f = OrderListQuery {
            status: Some("cooking".into()),
            date: None,
        }
        .validate(offset)
        .unwrap();
        assert_eq!(f.status, Some(OrderStatus::Cooking));

        assert!(OrderListQuery { status: Some("nope".into()), date: None }.validate(offset).is_err());
    }
}
