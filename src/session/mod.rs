mod extractors;
mod store;
mod token;

use serde::Serialize;
use uuid::Uuid;

use crate::{auth::repo_types::Role, cart::model::Cart};

pub use extractors::{session_layer, Session};
#[cfg(test)]
pub use extractors::SESSION_COOKIE;
pub use store::SessionStore;
pub use token::SessionKeys;

/// Authenticated staff summary kept in the session after login.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot notice shown on the next page view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub user: Option<SessionUser>,
    pub cart: Cart,
    pub table_number: Option<String>,
    /// Set when the table number came from a QR scan of the menu link.
    pub table_locked: bool,
    flashes: Vec<Flash>,
}

impl SessionData {
    /// QR menu link: the table is set and locked for checkout.
    pub fn lock_table(&mut self, table: &str) {
        self.table_number = Some(table.to_string());
        self.table_locked = true;
    }

    /// Plain scan redirect: sets the table without touching the lock flag.
    pub fn set_table(&mut self, table: &str) {
        self.table_number = Some(table.to_string());
    }

    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.flashes.push(Flash {
            kind: FlashKind::Success,
            message: message.into(),
        });
    }

    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flashes.push(Flash {
            kind: FlashKind::Error,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }
}

/// Normalizes a `meja` query value. Blank values are ignored.
pub fn table_param(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_then_plain_set_keeps_lock() {
        let mut s = SessionData::default();
        s.lock_table("4");
        s.set_table("9");
        assert_eq!(s.table_number.as_deref(), Some("9"));
        assert!(s.table_locked);
    }

    #[test]
    fn flashes_are_consumed_once() {
        let mut s = SessionData::default();
        s.flash_error("cart is empty");
        assert_eq!(s.take_flashes().len(), 1);
        assert!(s.take_flashes().is_empty());
    }

    #[test]
    fn blank_table_param_is_ignored() {
        assert_eq!(table_param(Some(" 12 ")), Some("12"));
        assert_eq!(table_param(Some("  ")), None);
        assert_eq!(table_param(None), None);
    }
}
