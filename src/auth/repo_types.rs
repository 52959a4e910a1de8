use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::InvalidStatus;

/// Staff role. Every role can reach the kitchen and order screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Kasir,
    Kitchen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Kasir => "kasir",
            Role::Kitchen => "kitchen",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Cashier desk duties: reservations.
    pub fn is_cashier_or_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Kasir)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "kasir" => Ok(Role::Kasir),
            "kitchen" => Ok(Role::Kitchen),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Row as stored in `users`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = InvalidStatus;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            full_name: r.full_name,
            role: r.role.parse()?,
            is_active: r.is_active,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShiftEntry {
    pub user_id: Uuid,
    pub full_name: String,
    pub role: String,
    #[serde(serialize_with = "crate::forms::serialize_date")]
    pub shift_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub check_in: OffsetDateTime,
}
