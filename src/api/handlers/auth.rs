//! Authentication handlers: login, registration, account listing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::{Capability, NewUser};
use crate::error::{ErrorResponse, MonitorError};

/// `POST /auth/login` — Exchange credentials for an access token.
///
/// The same rejection covers an unknown email, a wrong password, and a
/// deactivated account, so the response does not reveal which accounts
/// exist.
///
/// # Errors
///
/// Returns [`MonitorError::Unauthorized`] on any credential failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed access token", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    let rejected = || MonitorError::Unauthorized("invalid email or password".to_string());

    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(rejected)?;

    if !verify_password(&req.password, &user.password_hash)? || !user.is_active {
        return Err(rejected());
    }

    let (access_token, expires_at) = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_at,
    }))
}

/// `POST /auth/register` — Create a user account.
///
/// # Errors
///
/// - [`MonitorError::InvalidRequest`] if the password is shorter than 6
///   characters.
/// - [`MonitorError::EmailTaken`] if the email is already registered.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    summary = "Register an account",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Created account", body = crate::domain::User),
        (status = 400, description = "Password too short", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    if req.password.len() < 6 {
        return Err(MonitorError::InvalidRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }

    let new_user = NewUser {
        email: req.email,
        password_hash: hash_password(&req.password)?,
        first_name: req.first_name,
        last_name: req.last_name,
        role: req.role,
    };
    let user = state.store.insert_user(&new_user).await?;
    tracing::info!(user_id = %user.id, role = ?user.role, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /auth/me` — The calling user's own account.
///
/// # Errors
///
/// Returns [`MonitorError::Unauthorized`] if the account no longer exists
/// or has been deactivated.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    summary = "Current account",
    responses(
        (status = 200, description = "The calling user's account", body = crate::domain::User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, MonitorError> {
    let user = auth.load_user(&state).await?;
    Ok(Json(user))
}

/// `GET /auth/users` — All user accounts.
///
/// # Errors
///
/// Returns [`MonitorError::Forbidden`] when the caller may not manage
/// users.
#[utoipa::path(
    get,
    path = "/api/v1/auth/users",
    tag = "Auth",
    summary = "List accounts",
    responses(
        (status = 200, description = "All user accounts", body = Vec<crate::domain::User>),
        (status = 403, description = "Caller may not manage users", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, MonitorError> {
    auth.require(Capability::ManageUsers)?;
    let users = state.store.list_users().await?;
    Ok(Json(users))
}

/// Authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/auth/users", get(list_users))
}
