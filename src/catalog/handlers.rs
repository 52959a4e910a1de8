use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        AdminProductsView, CategoryForm, CompanyView, CreatedResponse, HomeView, MenuView,
        ProductForm, QrCodesView, TableLink, TableQuery, ToggleResponse,
    },
    repo,
    repo_types::{Category, Product},
    services::group_menu,
};
use crate::{
    auth::extractors::{AdminUser, StaffUser},
    db::is_foreign_key_violation,
    error::{AppError, AppResult},
    session::{table_param, Session},
    state::AppState,
};

const FEATURED_LIMIT: i64 = 6;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/scan", get(scan_table))
        .route("/menu", get(menu))
        .route("/menu/product/:id", get(product_detail))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/products", get(list_products).post(create_product))
        .route("/admin/products/:id", post(update_product))
        .route("/admin/products/:id/toggle", post(toggle_product))
        .route("/admin/products/:id/delete", post(delete_product))
        .route("/admin/categories", get(list_categories).post(create_category))
        .route("/admin/categories/:id", post(update_category))
        .route("/admin/qrcodes", get(qr_codes))
}

// --- public ---

#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> AppResult<Json<HomeView>> {
    let company = state.catalog.company_info().await?;
    let products = state.catalog.featured_products(FEATURED_LIMIT).await?;
    Ok(Json(HomeView { company, products }))
}

#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> AppResult<Json<CompanyView>> {
    Ok(Json(CompanyView {
        company: state.catalog.company_info().await?,
    }))
}

#[instrument(skip(state))]
pub async fn contact(State(state): State<AppState>) -> AppResult<Json<CompanyView>> {
    Ok(Json(CompanyView {
        company: state.catalog.company_info().await?,
    }))
}

/// GET /scan?meja=N: remembers the table and sends the guest to the menu.
#[instrument(skip(session))]
pub async fn scan_table(mut session: Session, Query(q): Query<TableQuery>) -> Redirect {
    if let Some(table) = table_param(q.meja.as_deref()) {
        session.data.set_table(table);
        session.data.flash_success(format!("Table {table} detected"));
        info!(table, "table set from scan");
    }
    session.save().await;
    Redirect::to("/menu")
}

/// GET /menu?meja=N, the QR entry point. A `meja` value sets and locks the
/// table; without one the previously locked table is kept.
#[instrument(skip(state, session))]
pub async fn menu(
    State(state): State<AppState>,
    mut session: Session,
    Query(q): Query<TableQuery>,
) -> AppResult<Json<MenuView>> {
    if let Some(table) = table_param(q.meja.as_deref()) {
        session.data.lock_table(table);
        info!(table, "table locked from QR");
    }

    let categories = state.catalog.active_categories().await?;
    let products = state.catalog.menu_products().await?;

    let view = MenuView {
        table_number: session.data.table_number.clone(),
        table_number_locked: session.data.table_locked,
        sections: group_menu(categories, products),
        flashes: session.data.take_flashes(),
    };
    session.save().await;
    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let not_found = || AppError::not_found("product not found");
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    state
        .catalog
        .find_product(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

// --- admin ---

#[instrument(skip(state, _user))]
pub async fn list_products(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
) -> AppResult<Json<AdminProductsView>> {
    let products = repo::list_all_products(&state.db).await?;
    let categories = repo::list_all_categories(&state.db).await?;
    Ok(Json(AdminProductsView {
        products,
        categories,
    }))
}

fn unknown_category(e: anyhow::Error) -> AppError {
    if is_foreign_key_violation(&e) {
        AppError::validation("category does not exist")
    } else {
        AppError::Internal(e)
    }
}

#[instrument(skip(state, user, form))]
pub async fn create_product(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    Form(form): Form<ProductForm>,
) -> AppResult<Json<CreatedResponse>> {
    let input = form.validate()?;
    let id = repo::insert_product(&state.db, &input)
        .await
        .map_err(unknown_category)?;
    info!(product_id = %id, name = %input.name, by = %user.username, "product created");
    Ok(Json(CreatedResponse { success: true, id }))
}

#[instrument(skip(state, user, form))]
pub async fn update_product(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    Path(id): Path<Uuid>,
    Form(form): Form<ProductForm>,
) -> AppResult<Json<CreatedResponse>> {
    let input = form.validate()?;
    let found = repo::update_product(&state.db, id, &input)
        .await
        .map_err(unknown_category)?;
    if !found {
        return Err(AppError::not_found("product not found"));
    }
    info!(product_id = %id, by = %user.username, "product updated");
    Ok(Json(CreatedResponse { success: true, id }))
}

#[instrument(skip(state, _user))]
pub async fn toggle_product(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ToggleResponse>> {
    let is_available = repo::toggle_availability(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("product not found"))?;
    Ok(Json(ToggleResponse {
        success: true,
        is_available,
    }))
}

#[instrument(skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CreatedResponse>> {
    let deleted = repo::delete_product(&state.db, id).await.map_err(|e| {
        if is_foreign_key_violation(&e) {
            warn!(product_id = %id, "delete blocked by existing orders");
            AppError::validation("product appears in past orders; mark it unavailable instead")
        } else {
            AppError::Internal(e)
        }
    })?;
    if !deleted {
        return Err(AppError::not_found("product not found"));
    }
    info!(product_id = %id, by = %user.username, "product deleted");
    Ok(Json(CreatedResponse { success: true, id }))
}

#[instrument(skip(state, _user))]
pub async fn list_categories(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(repo::list_all_categories(&state.db).await?))
}

#[instrument(skip(state, _user, form))]
pub async fn create_category(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Form(form): Form<CategoryForm>,
) -> AppResult<Json<CreatedResponse>> {
    let input = form.validate(true)?;
    let id = repo::insert_category(&state.db, &input).await?;
    Ok(Json(CreatedResponse { success: true, id }))
}

#[instrument(skip(state, _user, form))]
pub async fn update_category(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Path(id): Path<Uuid>,
    Form(form): Form<CategoryForm>,
) -> AppResult<Json<CreatedResponse>> {
    let input = form.validate(false)?;
    if !repo::update_category(&state.db, id, &input).await? {
        return Err(AppError::not_found("category not found"));
    }
    Ok(Json(CreatedResponse { success: true, id }))
}

/// Menu links for every table; the QR images themselves are drawn client-side.
#[instrument(skip(state, _user))]
pub async fn qr_codes(State(state): State<AppState>, AdminUser(_user): AdminUser) -> Json<QrCodesView> {
    let base_url = state.config.base_url.trim_end_matches('/').to_string();
    let tables = (1..=state.config.total_tables)
        .map(|number| TableLink {
            number,
            url: format!("{base_url}/menu?meja={number}"),
        })
        .collect();
    Json(QrCodesView { base_url, tables })
}
