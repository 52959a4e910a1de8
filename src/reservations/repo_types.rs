use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::error::InvalidStatus;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(clock_time, Time, "[hour]:[minute]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Staff list order.
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Pending,
        ReservationStatus::Approved,
        ReservationStatus::Rejected,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    /// Values staff may set. A reservation never goes back to pending.
    pub const STAFF_SETTABLE: [ReservationStatus; 4] = [
        ReservationStatus::Approved,
        ReservationStatus::Rejected,
        ReservationStatus::Cancelled,
        ReservationStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Menunggu",
            ReservationStatus::Approved => "Disetujui",
            ReservationStatus::Rejected => "Ditolak",
            ReservationStatus::Completed => "Selesai",
            ReservationStatus::Cancelled => "Dibatalkan",
        }
    }

    pub fn staff_rank(&self) -> u8 {
        match self {
            ReservationStatus::Pending => 1,
            ReservationStatus::Approved => 2,
            ReservationStatus::Rejected => 3,
            ReservationStatus::Completed => 4,
            ReservationStatus::Cancelled => 5,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// Reservation joined with the approving staff member's name.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub reservation_date: Date,
    pub reservation_time: Time,
    pub guest_count: i32,
    pub notes: Option<String>,
    pub status: String,
    pub admin_notes: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_by_name: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub customer_name: String,
    pub phone: String,
    #[serde(with = "iso_date")]
    pub reservation_date: Date,
    #[serde(with = "clock_time")]
    pub reservation_time: Time,
    pub guest_count: i32,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    pub admin_notes: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_by_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = InvalidStatus;

    fn try_from(r: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: r.status.parse()?,
            id: r.id,
            customer_name: r.customer_name,
            phone: r.phone,
            reservation_date: r.reservation_date,
            reservation_time: r.reservation_time,
            guest_count: r.guest_count,
            notes: r.notes,
            admin_notes: r.admin_notes,
            approved_by: r.approved_by,
            approved_by_name: r.approved_by_name,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub customer_name: String,
    pub phone: String,
    pub reservation_date: Date,
    pub reservation_time: Time,
    pub guest_count: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReservationUpdate<'a> {
    pub status: ReservationStatus,
    /// `None` keeps the notes already stored.
    pub admin_notes: Option<&'a str>,
    pub actor: Uuid,
}
