use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::SessionConfig, state::AppState};

/// Payload of the session cookie. `sub` is the opaque session id.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    pub ttl: Duration,
}

impl SessionKeys {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(1) as u64) * 60),
        }
    }

    pub fn sign(&self, session_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: session_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%session_id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::new(&state.config.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str, issuer: &str, audience: &str) -> SessionKeys {
        SessionKeys::new(&SessionConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 30,
            max_entries: 10,
        })
    }

    #[test]
    fn signed_session_id_round_trips() {
        let keys = keys("dev-secret", "nosty", "nosty-web");
        let sid = Uuid::new_v4();
        let token = keys.sign(sid).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, sid);
        assert_eq!(claims.iss, "nosty");
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let ours = keys("secret-a", "nosty", "nosty-web");
        let theirs = keys("secret-b", "nosty", "nosty-web");
        let token = theirs.sign(Uuid::new_v4()).expect("sign");
        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let good = keys("same", "nosty", "nosty-web");
        let other = keys("same", "nosty", "someone-else");
        let token = other.sign(Uuid::new_v4()).expect("sign");
        assert!(good.verify(&token).is_err());
    }
}
