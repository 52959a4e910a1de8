//! Staff audit trail and daily shift check-ins.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    Login,
    Logout,
    UpdateStatus,
    UpdateReservation,
    AddUser,
    EditUser,
    DeleteUser,
}

impl ActivityAction {
    pub fn code(&self) -> &'static str {
        match self {
            ActivityAction::Login => "LOGIN",
            ActivityAction::Logout => "LOGOUT",
            ActivityAction::UpdateStatus => "UPDATE_STATUS",
            ActivityAction::UpdateReservation => "UPDATE_RESERVATION",
            ActivityAction::AddUser => "ADD_USER",
            ActivityAction::EditUser => "EDIT_USER",
            ActivityAction::DeleteUser => "DELETE_USER",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub description: String,
    pub order_id: Option<Uuid>,
}

impl ActivityEntry {
    pub fn new(user_id: Uuid, action: ActivityAction, description: impl Into<String>) -> Self {
        Self {
            user_id,
            action,
            description: description.into(),
            order_id: None,
        }
    }

    pub fn for_order(mut self, order_id: Uuid) -> Self {
        self.order_id = Some(order_id);
        self
    }
}

#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, entry: ActivityEntry) -> anyhow::Result<()>;
    /// First login of the day creates the shift row; later logins keep the original check-in.
    async fn record_shift(&self, user_id: Uuid, day: Date) -> anyhow::Result<()>;
}

/// Writes the entry, logging instead of failing the request when the write fails.
pub async fn record_quietly(log: &dyn ActivityLog, entry: ActivityEntry) {
    let action = entry.action.code();
    if let Err(e) = log.record(entry).await {
        warn!(action, error = %format!("{e:#}"), "activity log write failed");
    }
}

#[derive(Clone)]
pub struct PgActivityLog {
    db: PgPool,
}

impl PgActivityLog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityLog for PgActivityLog {
    async fn record(&self, entry: ActivityEntry) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO activity_logs (user_id, action, description, order_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.user_id)
        .bind(entry.action.code())
        .bind(&entry.description)
        .bind(entry.order_id)
        .execute(&self.db)
        .await
        .context("insert activity log")?;
        Ok(())
    }

    async fn record_shift(&self, user_id: Uuid, day: Date) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO staff_shifts (user_id, shift_date, check_in)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id, shift_date) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(day)
        .execute(&self.db)
        .await
        .context("record staff shift")?;
        Ok(())
    }
}
