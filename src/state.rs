use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    activity::{ActivityLog, PgActivityLog},
    catalog::repo::{CatalogStore, PgCatalogStore},
    config::AppConfig,
    orders::repo::{OrderStore, PgOrderStore},
    reservations::repo::{PgReservationStore, ReservationStore},
    session::{SessionKeys, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub activity: Arc<dyn ActivityLog>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        Self::from_parts(
            db.clone(),
            Arc::new(config),
            Arc::new(PgCatalogStore::new(db.clone())),
            Arc::new(PgOrderStore::new(db.clone())),
            Arc::new(PgReservationStore::new(db.clone())),
            Arc::new(PgActivityLog::new(db)),
        )
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        reservations: Arc<dyn ReservationStore>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        let ttl = SessionKeys::new(&config.session).ttl;
        let sessions = Arc::new(SessionStore::new(ttl, config.session.max_entries));
        Self {
            db,
            config,
            sessions,
            catalog,
            orders,
            reservations,
            activity,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by in-memory stores. The pool is lazy and never connects
    /// unless a handler reaches for `db` directly.
    pub fn fake(fakes: &crate::testing::Fakes) -> Self {
        let config = crate::testing::test_config();
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");
        Self::from_parts(
            db,
            Arc::new(config),
            fakes.catalog.clone(),
            fakes.orders.clone(),
            fakes.reservations.clone(),
            fakes.activity.clone(),
        )
    }
}
