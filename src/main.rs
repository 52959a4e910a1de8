mod activity;
mod app;
mod auth;
mod cart;
mod catalog;
mod config;
mod db;
mod error;
mod forms;
mod orders;
mod reservations;
mod session;
mod state;
#[cfg(test)]
mod testing;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nosty=debug,axum=info,tower_http=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = db::connect(&config).await?;
    db::migrate(&db).await;
    db::seed(&db, &config.seed_password).await?;

    tracing::info!(
        tables = config.total_tables,
        utc_offset = %config.utc_offset,
        "starting nosty"
    );
    let state = AppState::new(db, config.clone());
    let app = app::build_app(state);
    app::serve(app, &config).await
}
