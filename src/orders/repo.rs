use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use super::repo_types::{
    NewOrder, NewOrderItem, Order, OrderFilter, OrderItemView, OrderRow, OrderStatus,
    OrderWithItems, StatusChange,
};

const ORDER_COLUMNS: &str =
    "id, order_number, customer_name, table_number, total_price, notes, status, created_at, updated_at";

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order and every item in one transaction. On error nothing is kept.
    async fn create_with_items(&self, order: &NewOrder, items: &[NewOrderItem]) -> anyhow::Result<Order>;
    async fn find_by_number(&self, order_number: &str) -> anyhow::Result<Option<OrderWithItems>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<OrderWithItems>>;
    /// Writes the new status; `None` when the order does not exist.
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> anyhow::Result<Option<StatusChange>>;
    /// Orders whose status is pending, paid or cooking, with their items.
    async fn list_in_progress(&self) -> anyhow::Result<Vec<OrderWithItems>>;
    /// Newest first.
    async fn list(&self, filter: &OrderFilter) -> anyhow::Result<Vec<Order>>;
}

#[derive(Clone)]
pub struct PgOrderStore {
    db: PgPool,
}

impl PgOrderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn items_for(&self, order_ids: &[Uuid]) -> anyhow::Result<Vec<OrderItemView>> {
        let rows = sqlx::query_as::<_, OrderItemView>(
            r#"
            SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name, p.image,
                   oi.qty, oi.price_at_order, oi.variant_info, oi.notes
              FROM order_items oi
              JOIN products p ON p.id = oi.product_id
             WHERE oi.order_id = ANY($1)
             ORDER BY oi.order_id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.db)
        .await
        .context("load order items")?;
        Ok(rows)
    }

    async fn with_items(&self, orders: Vec<Order>) -> anyhow::Result<Vec<OrderWithItems>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut grouped: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
        for item in self.items_for(&ids).await? {
            grouped.entry(item.order_id).or_default().push(item);
        }
        Ok(orders
            .into_iter()
            .map(|order| OrderWithItems {
                items: grouped.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }

    async fn attach_items(&self, row: Option<OrderRow>) -> anyhow::Result<Option<OrderWithItems>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let order = Order::try_from(row).context("decode order")?;
        Ok(self.with_items(vec![order]).await?.pop())
    }
}

async fn insert_order_tx(
    tx: &mut Transaction<'_, Postgres>,
    order: &NewOrder,
) -> anyhow::Result<Order> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r#"
        INSERT INTO orders (order_number, customer_name, table_number, total_price, notes, status)
        VALUES ($1, $2, $3, $4, $5, 'pending')
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(&order.order_number)
    .bind(&order.customer_name)
    .bind(&order.table_number)
    .bind(order.total_price)
    .bind(&order.notes)
    .fetch_one(&mut **tx)
    .await
    .context("insert order")?;
    Order::try_from(row).context("decode order")
}

async fn insert_item_tx(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    item: &NewOrderItem,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, qty, price_at_order, variant_info, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.qty)
    .bind(item.price_at_order)
    .bind(&item.variant_info)
    .bind(&item.notes)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("insert order item for product {}", item.product_id))?;
    Ok(())
}

async fn write_order_tx(
    tx: &mut Transaction<'_, Postgres>,
    order: &NewOrder,
    items: &[NewOrderItem],
) -> anyhow::Result<Order> {
    let created = insert_order_tx(tx, order).await?;
    for item in items {
        insert_item_tx(tx, created.id, item).await?;
    }
    Ok(created)
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_with_items(&self, order: &NewOrder, items: &[NewOrderItem]) -> anyhow::Result<Order> {
        let mut tx = self.db.begin().await.context("begin order tx")?;
        match write_order_tx(&mut tx, order, items).await {
            Ok(created) => {
                tx.commit().await.context("commit order tx")?;
                debug!(order_id = %created.id, items = items.len(), "order committed");
                Ok(created)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(error = %rb, "order tx rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn find_by_number(&self, order_number: &str) -> anyhow::Result<Option<OrderWithItems>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number)
        .fetch_optional(&self.db)
        .await
        .context("find order by number")?;
        self.attach_items(row).await
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<OrderWithItems>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find order by id")?;
        self.attach_items(row).await
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> anyhow::Result<Option<StatusChange>> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            UPDATE orders o
               SET status = $2, updated_at = now()
              FROM (SELECT id, status FROM orders WHERE id = $1 FOR UPDATE) old
             WHERE o.id = old.id
         RETURNING o.order_number, old.status
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update order status")?;

        row.map(|(order_number, old)| -> anyhow::Result<StatusChange> {
            Ok(StatusChange {
                order_id: id,
                order_number,
                old: old.parse().context("decode previous status")?,
                new: status,
            })
        })
        .transpose()
    }

    async fn list_in_progress(&self) -> anyhow::Result<Vec<OrderWithItems>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
              FROM orders
             WHERE status = ANY($1)
             ORDER BY CASE status
                        WHEN 'pending' THEN 1
                        WHEN 'paid' THEN 2
                        WHEN 'cooking' THEN 3
                      END,
                      created_at ASC
            "#
        ))
        .bind(OrderStatus::IN_PROGRESS.map(|s| s.as_str()).to_vec())
        .fetch_all(&self.db)
        .await
        .context("list in-progress orders")?;
        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()
            .context("decode orders")?;
        self.with_items(orders).await
    }

    async fn list(&self, filter: &OrderFilter) -> anyhow::Result<Vec<Order>> {
        let (from, until) = filter.created_between.unzip();
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
              FROM orders
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::timestamptz IS NULL OR created_at >= $2)
               AND ($3::timestamptz IS NULL OR created_at < $3)
             ORDER BY created_at DESC
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await
        .context("list orders")?;
        rows.into_iter()
            .map(|r| Order::try_from(r).context("decode order"))
            .collect()
    }
}
