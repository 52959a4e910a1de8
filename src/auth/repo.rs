use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::auth::repo_types::{Role, ShiftEntry, User, UserRow};

const USER_COLUMNS: &str = "id, username, password_hash, full_name, role, is_active, created_at";

fn into_user(row: UserRow) -> anyhow::Result<User> {
    User::try_from(row).context("decode user role")
}

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        row.map(into_user).transpose()
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY role, full_name"
        ))
        .fetch_all(db)
        .await
        .context("list users")?;
        rows.into_iter().map(into_user).collect()
    }

    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(role.as_str())
        .fetch_one(db)
        .await
        .context("insert user")?;
        into_user(row)
    }

    /// Returns `false` when no such user exists. The password is only replaced when given.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        full_name: &str,
        role: Role,
        is_active: bool,
        password_hash: Option<&str>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET full_name = $2,
                   role = $3,
                   is_active = $4,
                   password_hash = COALESCE($5, password_hash)
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(role.as_str())
        .bind(is_active)
        .bind(password_hash)
        .execute(db)
        .await
        .context("update user")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }
}

/// Staff who checked in on the given day, latest first.
pub async fn shifts_on(db: &PgPool, day: Date) -> anyhow::Result<Vec<ShiftEntry>> {
    let rows = sqlx::query_as::<_, ShiftEntry>(
        r#"
        SELECT ss.user_id, u.full_name, u.role, ss.shift_date, ss.check_in
          FROM staff_shifts ss
          JOIN users u ON u.id = ss.user_id
         WHERE ss.shift_date = $1
         ORDER BY ss.check_in DESC
        "#,
    )
    .bind(day)
    .fetch_all(db)
    .await
    .context("list shifts")?;
    Ok(rows)
}
