use rand::thread_rng;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::OrderConfirmation,
    number::{generate_order_number, is_order_number},
    repo::OrderStore,
    repo_types::{NewOrder, NewOrderItem, OrderStatus, OrderWithItems},
};
use crate::{
    activity::{record_quietly, ActivityAction, ActivityEntry, ActivityLog},
    cart::model::CartItem,
    db::is_unique_violation,
    error::{AppError, AppResult},
    forms::non_blank,
    session::{SessionData, SessionUser},
};

fn order_item(line: &CartItem) -> NewOrderItem {
    NewOrderItem {
        product_id: line.product_id,
        qty: line.qty,
        price_at_order: line.price,
        variant_info: Some(line.variant_info.clone()).filter(|v| !v.is_empty()),
        notes: Some(line.notes.clone()).filter(|n| !n.is_empty()),
    }
}

/// Turns the session cart into an order. Nothing is written unless every
/// precondition holds; the cart is only cleared after the commit.
pub async fn place_order(
    store: &dyn OrderStore,
    session: &mut SessionData,
    customer_name: Option<String>,
    notes: Option<String>,
    today: Date,
) -> AppResult<OrderConfirmation> {
    if session.cart.is_empty() {
        return Err(AppError::validation("cart is empty"));
    }
    let customer_name =
        non_blank(customer_name).ok_or_else(|| AppError::validation("customer name is required"))?;
    let table_number = session
        .table_number
        .clone()
        .ok_or_else(|| AppError::validation("please scan the QR code on your table first"))?;

    let totals = session.cart.totals();
    let order = NewOrder {
        order_number: generate_order_number(today, &mut thread_rng()),
        customer_name,
        table_number,
        total_price: totals.total,
        notes: non_blank(notes),
    };
    let items: Vec<NewOrderItem> = session.cart.items().iter().map(order_item).collect();

    let created = store.create_with_items(&order, &items).await.map_err(|e| {
        if is_unique_violation(&e) {
            warn!(order_number = %order.order_number, "order number collision");
        }
        AppError::Transaction(e)
    })?;

    session.cart.clear();
    info!(
        order_number = %created.order_number,
        table = %created.table_number,
        items = items.len(),
        total = created.total_price,
        "order placed"
    );
    Ok(OrderConfirmation {
        order_number: created.order_number,
        customer_name: created.customer_name,
        table_number: created.table_number,
        total: created.total_price,
    })
}

/// Any listed status may follow any other. The raw value is checked before
/// the order is looked up, so a bad value never touches the store.
pub async fn update_status(
    store: &dyn OrderStore,
    activity: &dyn ActivityLog,
    actor: &SessionUser,
    order_id: Uuid,
    raw_status: Option<&str>,
) -> AppResult<()> {
    let status: OrderStatus = raw_status
        .map(str::trim)
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::validation("invalid status"))?;

    let change = store
        .set_status(order_id, status)
        .await?
        .ok_or_else(|| AppError::not_found("order not found"))?;

    info!(
        order_number = %change.order_number,
        from = %change.old,
        to = %change.new,
        by = %actor.username,
        "order status changed"
    );
    let description = format!(
        "{} changed order #{} from {} to {}",
        actor.full_name,
        change.order_number,
        change.old.label(),
        change.new.label()
    );
    record_quietly(
        activity,
        ActivityEntry::new(actor.id, ActivityAction::UpdateStatus, description).for_order(order_id),
    )
    .await;
    Ok(())
}

pub async fn track(store: &dyn OrderStore, order_number: &str) -> AppResult<OrderWithItems> {
    let not_found = || AppError::not_found("order not found");
    let order_number = order_number.trim();
    if !is_order_number(order_number) {
        return Err(not_found());
    }
    store.find_by_number(order_number).await?.ok_or_else(not_found)
}

/// Pending first, then paid, then cooking; oldest first within a status.
pub fn sort_kitchen_queue(orders: &mut [OrderWithItems]) {
    orders.sort_by_key(|o| (o.order.status.kitchen_rank().unwrap_or(u8::MAX), o.order.created_at));
}

pub async fn list_active(store: &dyn OrderStore) -> AppResult<Vec<OrderWithItems>> {
    let mut orders = store.list_in_progress().await?;
    orders.retain(|o| o.order.status.kitchen_rank().is_some());
    sort_kitchen_queue(&mut orders);
    Ok(orders)
}
