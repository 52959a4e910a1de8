use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{
    error::AppError,
    session::{Session, SessionUser},
    state::AppState,
};

async fn session_user(parts: &mut Parts, state: &AppState) -> Result<SessionUser, AppError> {
    let session = Session::from_request_parts(parts, state).await?;
    session.data.user.ok_or(AppError::Unauthorized)
}

/// Any logged-in staff member (admin, kasir or kitchen).
pub struct StaffUser(pub SessionUser);

/// Admin only: users, QR links.
pub struct AdminUser(pub SessionUser);

/// Admin or kasir: reservation desk.
pub struct CashierUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(StaffUser(session_user(parts, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = session_user(parts, state).await?;
        if !user.role.is_admin() {
            warn!(user_id = %user.id, role = %user.role, uri = %parts.uri, "admin route denied");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CashierUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = session_user(parts, state).await?;
        if !user.role.is_cashier_or_admin() {
            warn!(user_id = %user.id, role = %user.role, uri = %parts.uri, "cashier route denied");
            return Err(AppError::Forbidden);
        }
        Ok(CashierUser(user))
    }
}
