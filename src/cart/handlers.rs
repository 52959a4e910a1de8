use axum::{
    extract::State,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        parse_item_id, AddToCart, AddToCartForm, CartData, CartMutationResponse, CartView, ClearResponse,
        RemoveCartForm, UpdateCartForm,
    },
    model::CartTotals,
    services,
};
use crate::{error::AppResult, session::Session, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(view_cart))
        .route("/cart/data", get(cart_data))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/update", post(update_item))
        .route("/cart/remove", post(remove_item))
        .route("/cart/clear", post(clear_cart))
}

fn mutation(totals: CartTotals, message: Option<&str>) -> Json<CartMutationResponse> {
    Json(CartMutationResponse {
        success: true,
        message: message.map(str::to_string),
        item_count: totals.item_count,
        total: totals.total,
    })
}

#[instrument(skip(session))]
pub async fn view_cart(session: Session) -> Json<CartView> {
    let cart = &session.data.cart;
    Json(CartView {
        cart: cart.items().to_vec(),
        total: cart.totals().total,
        table_number: session.data.table_number.clone(),
    })
}

#[instrument(skip(session))]
pub async fn cart_data(session: Session) -> Json<CartData> {
    let cart = &session.data.cart;
    let totals = cart.totals();
    Json(CartData {
        cart: cart.items().to_vec(),
        total: totals.total,
        item_count: totals.item_count,
    })
}

#[instrument(skip(state, session))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<AddToCartForm>,
) -> AppResult<Json<CartMutationResponse>> {
    let req = AddToCart::try_from(form)?;
    let totals = services::add_item(state.catalog.as_ref(), &mut session.data.cart, &req).await?;
    session.save().await;
    Ok(mutation(totals, Some("added to cart")))
}

#[instrument(skip(session))]
pub async fn update_item(
    mut session: Session,
    Form(form): Form<UpdateCartForm>,
) -> AppResult<Json<CartMutationResponse>> {
    let (item_id, qty) = form.validate()?;
    let totals = services::update_quantity(&mut session.data.cart, item_id, qty)?;
    session.save().await;
    Ok(mutation(totals, None))
}

#[instrument(skip(session))]
pub async fn remove_item(mut session: Session, Form(form): Form<RemoveCartForm>) -> Json<CartMutationResponse> {
    // absent ids are a no-op success
    let totals = match parse_item_id(form.item_id) {
        Ok(item_id) => services::remove(&mut session.data.cart, item_id),
        Err(_) => session.data.cart.totals(),
    };
    session.save().await;
    mutation(totals, None)
}

#[instrument(skip(session))]
pub async fn clear_cart(mut session: Session) -> Json<ClearResponse> {
    session.data.cart.clear();
    session.save().await;
    Json(ClearResponse { success: true })
}
