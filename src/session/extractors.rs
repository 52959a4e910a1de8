use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{Redirect, Response},
};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use super::{SessionData, SessionKeys, SessionStore};
use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "nosty_session";

#[derive(Debug, Clone, Copy)]
struct SessionId(Uuid);

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Resolves the session id from the signed cookie, minting a new one when the
/// cookie is absent, expired or forged.
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let existing = cookie_value(req.headers(), SESSION_COOKIE).and_then(|token| {
        keys.verify(token)
            .map_err(|e| warn!(error = %e, "discarding invalid session cookie"))
            .ok()
            .map(|claims| claims.sub)
    });

    let (id, fresh) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    };
    req.extensions_mut().insert(SessionId(id));

    let mut res = next.run(req).await;

    if fresh {
        match keys.sign(id) {
            Ok(token) => {
                let cookie = format!(
                    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                    keys.ttl.as_secs()
                );
                match HeaderValue::from_str(&cookie) {
                    Ok(v) => {
                        res.headers_mut().append(header::SET_COOKIE, v);
                    }
                    Err(e) => error!(error = %e, "session cookie is not a valid header"),
                }
            }
            Err(e) => error!(error = %e, "failed to sign session cookie"),
        }
    }
    res
}

/// The caller's session, loaded for the duration of one request.
/// Changes are only kept after [`Session::save`].
pub struct Session {
    id: Uuid,
    pub data: SessionData,
    store: Arc<SessionStore>,
}

impl Session {
    pub async fn save(self) {
        self.store.save(self.id, self.data).await;
    }

    pub async fn destroy(self) {
        self.store.destroy(self.id).await;
    }

    /// Page-flow failure: flashes the client-safe message, saves and redirects.
    pub async fn redirect_with_error(mut self, err: AppError, to: &str) -> Redirect {
        err.log();
        self.data.flash_error(err.public_message());
        self.save().await;
        Redirect::to(to)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let SessionId(id) = parts
            .extensions
            .get::<SessionId>()
            .copied()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session layer not installed")))?;
        let data = state.sessions.load(id).await;
        Ok(Session {
            id,
            data,
            store: state.sessions.clone(),
        })
    }
}
