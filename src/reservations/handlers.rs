use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{
        status_filter, PhoneLookupView, PhoneQuery, ReservationForm, ReservationFormView,
        ReservationStatusForm, StaffListQuery, StaffReservationsView,
    },
    services,
};
use crate::{
    auth::extractors::CashierUser,
    error::{AppError, AppResult},
    session::Session,
    state::AppState,
};

const STAFF_LIST: &str = "/admin/reservations";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservation", get(reservation_form).post(submit))
        .route("/reservation/status", get(status_by_phone))
        .route(STAFF_LIST, get(staff_list))
        .route("/admin/reservations/:id/status", post(update_status))
}

#[instrument(skip(session))]
pub async fn reservation_form(mut session: Session) -> Json<ReservationFormView> {
    let flashes = session.data.take_flashes();
    session.save().await;
    Json(ReservationFormView { flashes })
}

#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<ReservationForm>,
) -> Redirect {
    match services::submit(state.reservations.as_ref(), form, state.config.today()).await {
        Ok(created) => {
            session
                .data
                .flash_success("Reservation sent. We will confirm it by phone or WhatsApp.");
            session.save().await;
            Redirect::to(&format!(
                "/reservation/status?phone={}",
                urlencoding::encode(&created.phone)
            ))
        }
        Err(e) => session.redirect_with_error(e, "/reservation").await,
    }
}

/// Unauthenticated lookup by phone number.
#[instrument(skip(state, session))]
pub async fn status_by_phone(
    State(state): State<AppState>,
    mut session: Session,
    Query(q): Query<PhoneQuery>,
) -> AppResult<Json<PhoneLookupView>> {
    let phone = q.phone.as_deref().map(str::trim).unwrap_or_default().to_string();
    let reservations = services::list_by_phone(state.reservations.as_ref(), q.phone).await?;
    let view = PhoneLookupView {
        phone,
        reservations,
        flashes: session.data.take_flashes(),
    };
    session.save().await;
    Ok(Json(view))
}

#[instrument(skip(state, session, _user))]
pub async fn staff_list(
    State(state): State<AppState>,
    CashierUser(_user): CashierUser,
    mut session: Session,
    Query(q): Query<StaffListQuery>,
) -> AppResult<Json<StaffReservationsView>> {
    let status = status_filter(q.status)?;
    let reservations = services::list_for_staff(state.reservations.as_ref(), status).await?;
    let pending_count = state.reservations.count_pending().await?;
    let view = StaffReservationsView {
        reservations,
        pending_count,
        filter: status.map_or("all", |s| s.as_str()).to_string(),
        flashes: session.data.take_flashes(),
    };
    session.save().await;
    Ok(Json(view))
}

/// Form post from the staff list; the outcome is flashed back onto it.
#[instrument(skip(state, session, user, form))]
pub async fn update_status(
    State(state): State<AppState>,
    CashierUser(user): CashierUser,
    mut session: Session,
    Path(id): Path<String>,
    Form(form): Form<ReservationStatusForm>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return session
            .redirect_with_error(AppError::not_found("reservation not found"), STAFF_LIST)
            .await
            .into_response();
    };
    let updated = services::update_status(
        state.reservations.as_ref(),
        state.activity.as_ref(),
        &user,
        id,
        form.status.as_deref(),
        form.admin_notes,
    )
    .await;

    match updated {
        Ok((reservation, status)) => {
            session.data.flash_success(format!(
                "Reservation for {} is now {}",
                reservation.customer_name,
                status.label()
            ));
            session.save().await;
            Redirect::to(STAFF_LIST).into_response()
        }
        Err(e) => session.redirect_with_error(e, STAFF_LIST).await.into_response(),
    }
}
