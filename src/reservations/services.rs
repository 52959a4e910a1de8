use time::Date;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::ReservationForm,
    repo::ReservationStore,
    repo_types::{Reservation, ReservationStatus, ReservationUpdate},
};
use crate::{
    activity::{record_quietly, ActivityAction, ActivityEntry, ActivityLog},
    error::{AppError, AppResult},
    forms::non_blank,
    session::SessionUser,
};

pub const PHONE_LOOKUP_LIMIT: i64 = 10;

pub async fn submit(store: &dyn ReservationStore, form: ReservationForm, today: Date) -> AppResult<Reservation> {
    let new = form.validate(today)?;
    let created = store.insert(&new).await?;
    info!(
        reservation_id = %created.id,
        date = %created.reservation_date,
        guests = created.guest_count,
        "reservation submitted"
    );
    Ok(created)
}

pub async fn list_by_phone(store: &dyn ReservationStore, phone: Option<String>) -> AppResult<Vec<Reservation>> {
    match non_blank(phone) {
        Some(phone) => Ok(store.list_by_phone(&phone, PHONE_LOOKUP_LIMIT).await?),
        None => Ok(Vec::new()),
    }
}

pub fn sort_for_staff(list: &mut [Reservation]) {
    list.sort_by_key(|r| (r.status.staff_rank(), r.reservation_date, r.reservation_time));
}

pub async fn list_for_staff(
    store: &dyn ReservationStore,
    status: Option<ReservationStatus>,
) -> AppResult<Vec<Reservation>> {
    let mut list = store.list_for_staff(status).await?;
    sort_for_staff(&mut list);
    Ok(list)
}

/// Returns the reservation as it was before the change.
pub async fn update_status(
    store: &dyn ReservationStore,
    activity: &dyn ActivityLog,
    actor: &SessionUser,
    id: Uuid,
    raw_status: Option<&str>,
    admin_notes: Option<String>,
) -> AppResult<(Reservation, ReservationStatus)> {
    let status = raw_status
        .map(str::trim)
        .and_then(|s| s.parse::<ReservationStatus>().ok())
        .filter(|s| ReservationStatus::STAFF_SETTABLE.contains(s))
        .ok_or_else(|| AppError::validation("invalid status"))?;

    let not_found = || AppError::not_found("reservation not found");
    let existing = store.find(id).await?.ok_or_else(not_found)?;

    let admin_notes = non_blank(admin_notes);
    let update = ReservationUpdate {
        status,
        admin_notes: admin_notes.as_deref(),
        actor: actor.id,
    };
    if !store.update_status(id, &update).await? {
        return Err(not_found());
    }

    info!(reservation_id = %id, from = %existing.status, to = %status, by = %actor.username, "reservation status changed");
    let description = format!(
        "{} set reservation of {} ({}) to {}",
        actor.full_name,
        existing.customer_name,
        existing.phone,
        status.label()
    );
    record_quietly(
        activity,
        ActivityEntry::new(actor.id, ActivityAction::UpdateReservation, description),
    )
    .await;
    Ok((existing, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::repo_types::Role,
        testing::{MemoryActivity, MemoryReservations},
    };
    use time::macros::date;

    const TODAY: Date = date!(2026 - 10 - 16);

    fn form(name: &str, phone: &str, date: &str, time: &str) -> ReservationForm {
        ReservationForm {
            customer_name: Some(name.into()),
            phone: Some(phone.into()),
            reservation_date: Some(date.into()),
            reservation_time: Some(time.into()),
            guest_count: Some("2".into()),
            notes: None,
        }
    }

    fn admin() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            username: "admin".into(),
            full_name: "Administrator".into(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn submitted_reservation_starts_pending() {
        let store = MemoryReservations::default();
        let r = submit(&store, form("Ani", "0812", "2026-10-16", "18:00"), TODAY).await.unwrap();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(store.count_pending().await.unwrap(), 1);

        let err = submit(&store, form("Ani", "0812", "2026-10-15", "18:00"), TODAY).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn phone_lookup_without_phone_is_empty() {
        let store = MemoryReservations::default();
        submit(&store, form("Ani", "0812", "2026-10-17", "18:00"), TODAY).await.unwrap();
        assert!(list_by_phone(&store, None).await.unwrap().is_empty());
        assert!(list_by_phone(&store, Some(" ".into())).await.unwrap().is_empty());
        assert_eq!(list_by_phone(&store, Some("0812".into())).await.unwrap().len(), 1);
        assert!(list_by_phone(&store, Some("0999".into())).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn staff_list_orders_by_status_then_schedule() {
        let store = MemoryReservations::default();
        let activity = MemoryActivity::default();
        let late = submit(&store, form("A", "1", "2026-10-18", "20:00"), TODAY).await.unwrap();
        let early = submit(&store, form("B", "2", "2026-10-18", "12:00"), TODAY).await.unwrap();
        let approved = submit(&store, form("C", "3", "2026-10-17", "09:00"), TODAY).await.unwrap();
        update_status(&store, &activity, &admin(), approved.id, Some("approved"), None)
            .await
            .unwrap();

        let ids: Vec<Uuid> = list_for_staff(&store, None).await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![early.id, late.id, approved.id]);

        let only_approved = list_for_staff(&store, Some(ReservationStatus::Approved)).await.unwrap();
        assert_eq!(only_approved.len(), 1);
    }

    #[tokio::test]
    async fn invalid_status_leaves_reservation_untouched() {
        let store = MemoryReservations::default();
        let activity = MemoryActivity::default();
        let r = submit(&store, form("Ani", "0812", "2026-10-20", "18:00"), TODAY).await.unwrap();

        for raw in [Some("pending"), Some("done"), None] {
            let err = update_status(&store, &activity, &admin(), r.id, raw, None).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(store.find(r.id).await.unwrap().unwrap().status, ReservationStatus::Pending);
        assert!(activity.entries().is_empty());
    }

    #[tokio::test]
    async fn approval_records_actor_and_keeps_old_notes() {
        let store = MemoryReservations::default();
        let activity = MemoryActivity::default();
        let actor = admin();
        let r = submit(&store, form("Ani", "0812", "2026-10-20", "18:00"), TODAY).await.unwrap();

        update_status(&store, &activity, &actor, r.id, Some("approved"), Some("window seat".into()))
            .await
            .unwrap();
        update_status(&store, &activity, &actor, r.id, Some("completed"), Some("".into()))
            .await
            .unwrap();

        let saved = store.find(r.id).await.unwrap().unwrap();
        assert_eq!(saved.status, ReservationStatus::Completed);
        assert_eq!(saved.admin_notes.as_deref(), Some("window seat"));
        assert_eq!(saved.approved_by, Some(actor.id));

        let entries = activity.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].action, ActivityAction::UpdateReservation);
        assert_eq!(entries[1].description, "Administrator set reservation of Ani (0812) to Selesai");
    }

    #[tokio::test]
    async fn unknown_reservation_is_not_found() {
        let err = update_status(
            &MemoryReservations::default(),
            &MemoryActivity::default(),
            &admin(),
            Uuid::new_v4(),
            Some("approved"),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
