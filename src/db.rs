use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::{
    auth::{password::hash_password, repo_types::Role},
    config::AppConfig,
};

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        warn!(error = %e, "migration failed; continuing");
    }
}

/// Creates the default staff accounts and menu categories on an empty database.
pub async fn seed(db: &PgPool, password: &str) -> anyhow::Result<()> {
    let has_admin: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = 'admin')")
            .fetch_one(db)
            .await
            .context("check admin user")?;

    if !has_admin {
        let hash = hash_password(password)?;
        for (username, full_name, role) in [
            ("admin", "Administrator", Role::Admin),
            ("kitchen", "Dapur", Role::Kitchen),
        ] {
            sqlx::query(
                r#"
                INSERT INTO users (username, password_hash, full_name, role)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (username) DO NOTHING
                "#,
            )
            .bind(username)
            .bind(&hash)
            .bind(full_name)
            .bind(role.as_str())
            .execute(db)
            .await
            .with_context(|| format!("seed user {username}"))?;
        }
        info!("seeded admin and kitchen users");
    }

    let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(db)
        .await
        .context("count categories")?;
    if categories == 0 {
        sqlx::query(
            r#"
            INSERT INTO categories (name, icon, sort_order) VALUES
                ('Kopi', 'fa-coffee', 1),
                ('Non-Kopi', 'fa-glass-water', 2),
                ('Makanan', 'fa-utensils', 3),
                ('Snack', 'fa-cookie', 4)
            "#,
        )
        .execute(db)
        .await
        .context("seed categories")?;
        info!("seeded default categories");
    }

    Ok(())
}

fn pg_code(e: &anyhow::Error) -> Option<String> {
    match e.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    pg_code(e).as_deref() == Some("23505")
}

pub fn is_foreign_key_violation(e: &anyhow::Error) -> bool {
    pg_code(e).as_deref() == Some("23503")
}
