use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateUserForm, LoginForm, LoginView, MeResponse, UpdateUserForm, UsersView},
    extractors::{AdminUser, StaffUser},
    password::{hash_password, verify_password},
    repo::shifts_on,
    repo_types::User,
};
use crate::{
    activity::{record_quietly, ActivityAction, ActivityEntry},
    db::is_unique_violation,
    error::{AppError, AppResult},
    forms::non_blank,
    session::{Session, SessionUser},
    state::AppState,
};

const LOGIN_PAGE: &str = "/admin/login";
const DASHBOARD: &str = "/admin/dashboard";
const USERS_PAGE: &str = "/admin/users";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PAGE, get(login_page).post(login))
        .route("/admin/logout", get(logout))
        .route("/admin/me", get(me))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(USERS_PAGE, get(list_users).post(create_user))
        .route("/admin/users/:id", post(update_user))
        .route("/admin/users/:id/delete", post(delete_user))
}

#[instrument(skip(session))]
pub async fn login_page(mut session: Session) -> Response {
    if session.data.user.is_some() {
        return Redirect::to(DASHBOARD).into_response();
    }
    let flashes = session.data.take_flashes();
    session.save().await;
    Json(LoginView { flashes }).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn login(State(state): State<AppState>, mut session: Session, Form(form): Form<LoginForm>) -> Redirect {
    if session.data.user.is_some() {
        return Redirect::to(DASHBOARD);
    }
    let (Some(username), Some(password)) = (non_blank(form.username), form.password) else {
        return session
            .redirect_with_error(AppError::validation("username and password are required"), LOGIN_PAGE)
            .await;
    };

    let user = match User::find_by_username(&state.db, &username).await {
        Ok(u) => u,
        Err(e) => return session.redirect_with_error(AppError::Internal(e), LOGIN_PAGE).await,
    };
    let user = match user {
        Some(u) if u.is_active => u,
        Some(u) => {
            warn!(user_id = %u.id, "login by inactive user");
            return session
                .redirect_with_error(AppError::validation("invalid credentials"), LOGIN_PAGE)
                .await;
        }
        None => {
            warn!(username = %username, "login unknown username");
            return session
                .redirect_with_error(AppError::validation("invalid credentials"), LOGIN_PAGE)
                .await;
        }
    };

    match verify_password(&password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "login invalid password");
            return session
                .redirect_with_error(AppError::validation("invalid credentials"), LOGIN_PAGE)
                .await;
        }
        Err(e) => return session.redirect_with_error(AppError::Internal(e), LOGIN_PAGE).await,
    }

    if let Err(e) = state.activity.record_shift(user.id, state.config.today()).await {
        warn!(user_id = %user.id, error = %format!("{e:#}"), "shift check-in not recorded");
    }
    record_quietly(
        state.activity.as_ref(),
        ActivityEntry::new(
            user.id,
            ActivityAction::Login,
            format!("{} ({}) logged in", user.full_name, user.role),
        ),
    )
    .await;

    info!(user_id = %user.id, role = %user.role, "staff logged in");
    session.data.user = Some(SessionUser {
        id: user.id,
        username: user.username,
        full_name: user.full_name.clone(),
        role: user.role,
    });
    session.data.flash_success(format!("Welcome, {}", user.full_name));
    session.save().await;
    Redirect::to(DASHBOARD)
}

#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    if let Some(user) = &session.data.user {
        record_quietly(
            state.activity.as_ref(),
            ActivityEntry::new(user.id, ActivityAction::Logout, format!("{} logged out", user.full_name)),
        )
        .await;
        info!(user_id = %user.id, "staff logged out");
    }
    session.destroy().await;
    Redirect::to(LOGIN_PAGE)
}

#[instrument(skip(user))]
pub async fn me(StaffUser(user): StaffUser) -> Json<MeResponse> {
    Json(MeResponse { user })
}

// --- user management (admin only) ---

#[instrument(skip(state, session, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    mut session: Session,
) -> AppResult<Json<UsersView>> {
    let users = User::list(&state.db).await?;
    let today_shifts = shifts_on(&state.db, state.config.today()).await?;
    let view = UsersView {
        users,
        today_shifts,
        flashes: session.data.take_flashes(),
    };
    session.save().await;
    Ok(Json(view))
}

async fn users_page_with(mut session: Session, outcome: AppResult<String>) -> Redirect {
    match outcome {
        Ok(message) => {
            session.data.flash_success(message);
            session.save().await;
            Redirect::to(USERS_PAGE)
        }
        Err(e) => session.redirect_with_error(e, USERS_PAGE).await,
    }
}

async fn add_user(state: &AppState, admin: &SessionUser, form: CreateUserForm) -> AppResult<String> {
    let new = form.validate()?;
    if User::find_by_username(&state.db, &new.username).await?.is_some() {
        return Err(AppError::validation("username is already taken"));
    }
    let hash = hash_password(&new.password)?;
    let created = User::create(&state.db, &new.username, &hash, &new.full_name, new.role)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::validation("username is already taken")
            } else {
                AppError::Internal(e)
            }
        })?;

    info!(user_id = %created.id, role = %created.role, by = %admin.username, "user created");
    record_quietly(
        state.activity.as_ref(),
        ActivityEntry::new(
            admin.id,
            ActivityAction::AddUser,
            format!("{} added user {} ({})", admin.full_name, created.full_name, created.role),
        ),
    )
    .await;
    Ok(format!("User {} created", created.username))
}

#[instrument(skip(state, admin, session, form))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    session: Session,
    Form(form): Form<CreateUserForm>,
) -> Redirect {
    let outcome = add_user(&state, &admin, form).await;
    users_page_with(session, outcome).await
}

fn user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("user not found"))
}

async fn edit_user(state: &AppState, admin: &SessionUser, id: &str, form: UpdateUserForm) -> AppResult<String> {
    let id = user_id(id)?;
    let changes = form.validate()?;
    let hash = changes.password.as_deref().map(hash_password).transpose()?;
    let found = User::update(
        &state.db,
        id,
        &changes.full_name,
        changes.role,
        changes.is_active,
        hash.as_deref(),
    )
    .await?;
    if !found {
        return Err(AppError::not_found("user not found"));
    }

    info!(user_id = %id, password_changed = hash.is_some(), by = %admin.username, "user updated");
    record_quietly(
        state.activity.as_ref(),
        ActivityEntry::new(
            admin.id,
            ActivityAction::EditUser,
            format!("{} edited user {}", admin.full_name, changes.full_name),
        ),
    )
    .await;
    Ok("User updated".to_string())
}

#[instrument(skip(state, admin, session, form))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<UpdateUserForm>,
) -> Redirect {
    let outcome = edit_user(&state, &admin, &id, form).await;
    users_page_with(session, outcome).await
}

async fn remove_user(state: &AppState, admin: &SessionUser, id: &str) -> AppResult<String> {
    let id = user_id(id)?;
    if id == admin.id {
        return Err(AppError::validation("you cannot delete your own account"));
    }
    if !User::delete(&state.db, id).await? {
        return Err(AppError::not_found("user not found"));
    }

    info!(user_id = %id, by = %admin.username, "user deleted");
    record_quietly(
        state.activity.as_ref(),
        ActivityEntry::new(admin.id, ActivityAction::DeleteUser, format!("{} deleted user {id}", admin.full_name)),
    )
    .await;
    Ok("User deleted".to_string())
}

#[instrument(skip(state, admin, session))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    let outcome = remove_user(&state, &admin, &id).await;
    users_page_with(session, outcome).await
}
