use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{
        CheckoutView, DashboardView, OrderConfirmation, OrderListQuery, OrderListView, PlaceOrderForm,
        StatusUpdateBody, SuccessResponse, TrackView,
    },
    repo_types::OrderWithItems,
    services,
};
use crate::{
    auth::extractors::StaffUser,
    error::{AppError, AppResult},
    session::Session,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order/checkout", get(checkout))
        .route("/order/place", post(place_order))
        .route("/order/track/:order_number", get(track))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/kitchen", get(kitchen))
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/:id", get(order_detail))
        .route("/admin/orders/:id/status", post(update_status))
}

#[instrument(skip(session))]
pub async fn checkout(mut session: Session) -> Response {
    if session.data.cart.is_empty() {
        return session
            .redirect_with_error(AppError::validation("cart is empty"), "/menu")
            .await
            .into_response();
    }
    let Some(table_number) = session.data.table_number.clone() else {
        return session
            .redirect_with_error(
                AppError::validation("please scan the QR code on your table first"),
                "/menu",
            )
            .await
            .into_response();
    };

    let view = CheckoutView {
        cart: session.data.cart.items().to_vec(),
        total: session.data.cart.totals().total,
        table_number,
        table_number_locked: session.data.table_locked,
        flashes: session.data.take_flashes(),
    };
    session.save().await;
    Json(view).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn place_order(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<PlaceOrderForm>,
) -> Response {
    let placed = services::place_order(
        state.orders.as_ref(),
        &mut session.data,
        form.customer_name,
        form.notes,
        state.config.today(),
    )
    .await;

    match placed {
        Ok(confirmation) => {
            session.save().await;
            Json::<OrderConfirmation>(confirmation).into_response()
        }
        Err(e) => session.redirect_with_error(e, "/order/checkout").await.into_response(),
    }
}

#[instrument(skip(state, session))]
pub async fn track(
    State(state): State<AppState>,
    mut session: Session,
    Path(order_number): Path<String>,
) -> Response {
    match services::track(state.orders.as_ref(), &order_number).await {
        Ok(order) => {
            let view = TrackView {
                order,
                flashes: session.data.take_flashes(),
            };
            session.save().await;
            Json(view).into_response()
        }
        Err(e) => session.redirect_with_error(e, "/menu").await.into_response(),
    }
}

// --- staff ---

#[instrument(skip(state, session, _user))]
pub async fn dashboard(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    mut session: Session,
) -> AppResult<Json<DashboardView>> {
    let active_orders = state.orders.list_in_progress().await?.len();
    let pending_reservations = state.reservations.count_pending().await?;
    let view = DashboardView {
        active_orders,
        pending_reservations,
        flashes: session.data.take_flashes(),
    };
    session.save().await;
    Ok(Json(view))
}

#[instrument(skip(state, _user))]
pub async fn kitchen(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
) -> AppResult<Json<Vec<OrderWithItems>>> {
    Ok(Json(services::list_active(state.orders.as_ref()).await?))
}

#[instrument(skip(state, _user))]
pub async fn list_orders(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Query(q): Query<OrderListQuery>,
) -> AppResult<Json<OrderListView>> {
    let filter = q.validate(state.config.utc_offset)?;
    let orders = state.orders.list(&filter).await?;
    Ok(Json(OrderListView { orders }))
}

fn order_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("order not found"))
}

#[instrument(skip(state, _user))]
pub async fn order_detail(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderWithItems>> {
    state
        .orders
        .find_by_id(order_id(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("order not found"))
}

#[instrument(skip(state, user, body))]
pub async fn update_status(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateBody>,
) -> AppResult<Json<SuccessResponse>> {
    services::update_status(
        state.orders.as_ref(),
        state.activity.as_ref(),
        &user,
        order_id(&id)?,
        body.status.as_deref(),
    )
    .await?;
    Ok(Json(SuccessResponse { success: true }))
}

