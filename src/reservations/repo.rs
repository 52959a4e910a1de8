use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewReservation, Reservation, ReservationRow, ReservationStatus, ReservationUpdate};

const RESERVATION_SELECT: &str = r#"
    SELECT r.id, r.customer_name, r.phone, r.reservation_date, r.reservation_time,
           r.guest_count, r.notes, r.status, r.admin_notes, r.approved_by,
           u.full_name AS approved_by_name, r.created_at
      FROM reservations r
      LEFT JOIN users u ON u.id = r.approved_by
"#;

fn decode(rows: Vec<ReservationRow>) -> anyhow::Result<Vec<Reservation>> {
    rows.into_iter()
        .map(|r| Reservation::try_from(r).context("decode reservation"))
        .collect()
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert(&self, new: &NewReservation) -> anyhow::Result<Reservation>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Reservation>>;
    /// Newest first.
    async fn list_by_phone(&self, phone: &str, limit: i64) -> anyhow::Result<Vec<Reservation>>;
    /// Ordered by status rank, then date and time ascending.
    async fn list_for_staff(&self, status: Option<ReservationStatus>) -> anyhow::Result<Vec<Reservation>>;
    async fn count_pending(&self) -> anyhow::Result<i64>;
    /// `false` when the reservation does not exist.
    async fn update_status(&self, id: Uuid, update: &ReservationUpdate<'_>) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgReservationStore {
    db: PgPool,
}

impl PgReservationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn insert(&self, new: &NewReservation) -> anyhow::Result<Reservation> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO reservations
                (customer_name, phone, reservation_date, reservation_time, guest_count, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.customer_name)
        .bind(&new.phone)
        .bind(new.reservation_date)
        .bind(new.reservation_time)
        .bind(new.guest_count)
        .bind(&new.notes)
        .fetch_one(&self.db)
        .await
        .context("insert reservation")?;

        self.find(id)
            .await?
            .with_context(|| format!("reservation {id} vanished after insert"))
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!("{RESERVATION_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find reservation")?;
        row.map(|r| Reservation::try_from(r).context("decode reservation"))
            .transpose()
    }

    async fn list_by_phone(&self, phone: &str, limit: i64) -> anyhow::Result<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{RESERVATION_SELECT} WHERE r.phone = $1 ORDER BY r.created_at DESC LIMIT $2"
        ))
        .bind(phone)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("list reservations by phone")?;
        decode(rows)
    }

    async fn list_for_staff(&self, status: Option<ReservationStatus>) -> anyhow::Result<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            r#"
            {RESERVATION_SELECT}
             WHERE ($1::text IS NULL OR r.status = $1)
             ORDER BY CASE r.status
                        WHEN 'pending' THEN 1
                        WHEN 'approved' THEN 2
                        WHEN 'rejected' THEN 3
                        WHEN 'completed' THEN 4
                        ELSE 5
                      END,
                      r.reservation_date ASC,
                      r.reservation_time ASC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await
        .context("list reservations")?;
        decode(rows)
    }

    async fn count_pending(&self) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE status = 'pending'")
            .fetch_one(&self.db)
            .await
            .context("count pending reservations")?;
        Ok(n)
    }

    async fn update_status(&self, id: Uuid, update: &ReservationUpdate<'_>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE reservations
               SET status = $2, admin_notes = COALESCE($3, admin_notes), approved_by = $4
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.admin_notes)
        .bind(update.actor)
        .execute(&self.db)
        .await
        .context("update reservation status")?;
        Ok(res.rows_affected() > 0)
    }
}
