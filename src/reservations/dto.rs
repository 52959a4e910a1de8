use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{NewReservation, Reservation, ReservationStatus};
use crate::{
    error::AppError,
    forms::{non_blank, parse_date, parse_num, parse_time, required},
    session::Flash,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationForm {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub reservation_date: Option<String>,
    pub reservation_time: Option<String>,
    pub guest_count: Option<String>,
    pub notes: Option<String>,
}

impl ReservationForm {
    /// `today` is the restaurant's calendar day; earlier dates are refused.
    pub fn validate(self, today: Date) -> Result<NewReservation, AppError> {
        let missing = || AppError::validation("all fields are required");
        let customer_name = required("customerName", self.customer_name).map_err(|_| missing())?;
        let phone = required("phone", self.phone).map_err(|_| missing())?;
        let reservation_date = parse_date("reservationDate", self.reservation_date)?.ok_or_else(missing)?;
        let reservation_time = parse_time("reservationTime", self.reservation_time)?.ok_or_else(missing)?;
        let guest_count = parse_num::<i32>("guestCount", self.guest_count)?.ok_or_else(missing)?;

        if guest_count < 1 {
            return Err(AppError::validation("guestCount must be at least 1"));
        }
        if reservation_date < today {
            return Err(AppError::validation("reservation date cannot be in the past"));
        }

        Ok(NewReservation {
            customer_name,
            phone,
            reservation_date,
            reservation_time,
            guest_count,
            notes: non_blank(self.notes),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StaffListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationStatusForm {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReservationFormView {
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct PhoneLookupView {
    pub phone: String,
    pub reservations: Vec<Reservation>,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffReservationsView {
    pub reservations: Vec<Reservation>,
    pub pending_count: i64,
    /// Echo of the applied filter, `all` when none.
    pub filter: String,
    pub flashes: Vec<Flash>,
}

/// `None` for blank or `all`.
pub fn status_filter(raw: Option<String>) -> Result<Option<ReservationStatus>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(s) if s == "all" => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation("invalid status")),
    }
}
