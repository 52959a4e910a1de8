use serde::{Deserialize, Serialize};

use super::{
    password::MIN_PASSWORD_LEN,
    repo_types::{Role, ShiftEntry, User},
};
use crate::{
    error::AppError,
    forms::{checked, required},
    session::{Flash, SessionUser},
};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersView {
    pub users: Vec<User>,
    pub today_shifts: Vec<ShiftEntry>,
    pub flashes: Vec<Flash>,
}

fn parse_role(raw: Option<String>) -> Result<Role, AppError> {
    required("role", raw)?
        .parse()
        .map_err(|_| AppError::validation("role must be admin, kasir or kitchen"))
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl CreateUserForm {
    pub fn validate(self) -> Result<NewUser, AppError> {
        let username = required("username", self.username)?;
        // passwords are taken as typed, only emptiness is checked after trimming
        let password = self
            .password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::validation("password is required"))?;
        check_password(&password)?;
        Ok(NewUser {
            username,
            password,
            full_name: required("full_name", self.full_name)?,
            role: parse_role(self.role)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    /// Replacement password; `None` keeps the current one.
    pub password: Option<String>,
}

impl UpdateUserForm {
    pub fn validate(self) -> Result<UserChanges, AppError> {
        let password = self.password.filter(|p| !p.trim().is_empty());
        if let Some(p) = &password {
            check_password(p)?;
        }
        Ok(UserChanges {
            full_name: required("full_name", self.full_name)?,
            role: parse_role(self.role)?,
            is_active: checked(&self.is_active),
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(password: &str, role: &str) -> CreateUserForm {
        CreateUserForm {
            username: Some(" kasir2 ".into()),
            password: Some(password.into()),
            full_name: Some("Dewi".into()),
            role: Some(role.into()),
        }
    }

    #[test]
    fn create_requires_known_role_and_long_password() {
        let ok = create("secret1", "kasir").validate().unwrap();
        assert_eq!(ok.username, "kasir2");
        assert_eq!(ok.role, Role::Kasir);

        assert!(create("short", "kasir").validate().is_err());
        assert!(create("secret1", "owner").validate().is_err());
        assert!(create("   ", "kasir").validate().is_err());
    }

    #[test]
    fn blank_password_on_update_keeps_current() {
        let changes = UpdateUserForm {
            full_name: Some("Dewi".into()),
            role: Some("kitchen".into()),
            is_active: None,
            password: Some("".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(changes.password, None);
        assert!(!changes.is_active);

        let err = UpdateUserForm {
            full_name: Some("Dewi".into()),
            role: Some("kitchen".into()),
            is_active: Some("on".into()),
            password: Some("abc".into()),
        }
        .validate();
        assert!(err.is_err());
    }
}
