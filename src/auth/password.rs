use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_password_verifies() {
        let hash = hash_password("admin123").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin123", &hash).expect("verify should succeed"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("kitchen-pass").expect("hashing should succeed");
        assert!(!verify_password("kitchen-pas", &hash).expect("verify should not error"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = verify_password("x", "plain-text-password").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
