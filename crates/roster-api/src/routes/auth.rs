//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
};
use roster_auth::{AuthUser, hash_password, verify_password};
use roster_store::{NewAccount, Role, StoreError};
use tracing::{debug, info, warn};
use validator::ValidateEmail;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest};

// ==================== Auth Extractors ====================

/// Extractor for an authenticated caller (required)
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        if !auth_header.starts_with("Bearer ") {
            return Err(ApiError::Unauthorized);
        }

        let token = &auth_header[7..];
        let claims = app_state.tokens.validate(token).ok_or(ApiError::Unauthorized)?;
        let user = AuthUser::from_claims(&claims);

        debug!("Authenticated caller: {} ({})", user.username, user.role.as_str());
        Ok(RequireAuth(user))
    }
}

/// Extractor for an Admin caller (required)
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(ApiError::Forbidden);
        }

        Ok(RequireAdmin(user))
    }
}

// ==================== Input Validation ====================

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
/// Login keeps the weaker legacy minimum; registration demands more
const MIN_LOGIN_PASSWORD_LENGTH: usize = 6;
pub(crate) const MIN_REGISTER_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 100;

/// Normalize a username or email for storage and lookup
pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Validate username length, counted in characters
pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let length = username.chars().count();
    if length < MIN_USERNAME_LENGTH || length > MAX_USERNAME_LENGTH {
        return Err(ApiError::Validation(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate password length against the given minimum, counted in characters
pub(crate) fn validate_password(password: &str, min: usize) -> Result<(), ApiError> {
    let length = password.chars().count();
    if length < min || length > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be between {} and {} characters",
            min, MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if !email.validate_email() {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

/// Parse a role claim; matching is exact, "admin" is not "Admin"
pub(crate) fn parse_role(role: &str) -> Result<Role, ApiError> {
    role.parse()
        .map_err(|_| ApiError::Validation("Role must be Admin or User".to_string()))
}

// ==================== Auth Routes ====================

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = normalize(&request.username);
    validate_username(&username)?;
    validate_password(&request.password, MIN_LOGIN_PASSWORD_LENGTH)?;

    debug!("Login attempt for account: {}", username);

    let account = state.accounts.find_by_username(&username).await?;

    // Always verify against some hash so response timing does not reveal
    // whether the username exists. The dummy is a valid Argon2 hash that
    // never matches.
    const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

    let (hash_to_verify, account) = match account {
        Some(a) => (a.password_hash.clone(), Some(a)),
        None => (DUMMY_HASH.to_string(), None),
    };

    let password_valid = verify_password(&request.password, &hash_to_verify);

    let account = match (account, password_valid) {
        (Some(a), true) => a,
        _ => {
            warn!("Rejected login for account: {}", username);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let (token, expires_at) = state.tokens.issue(&account)?;
    state.accounts.record_login(&account.id).await?;

    info!("Account {} logged in", account.username);
    metrics::counter!("roster_logins_total").increment(1);

    Ok(Json(LoginResponse {
        token,
        username: account.username,
        role: account.role.as_str().to_string(),
        expires_at,
    }))
}

/// POST /api/auth/register
///
/// A fresh registration is answered like a login, token included, so the
/// caller is signed in immediately. `last_login_at` stays unset until the
/// first explicit login.
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = normalize(&request.username);
    let email = normalize(&request.email);

    validate_username(&username)?;
    validate_password(&request.password, MIN_REGISTER_PASSWORD_LENGTH)?;
    validate_email(&email)?;
    let role = parse_role(&request.role)?;

    debug!("Registering account: {}", username);

    let password_hash = hash_password(&request.password)?;

    let account = state
        .accounts
        .create(NewAccount {
            username,
            email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => {
                ApiError::Conflict("Username or email already exists".to_string())
            }
            other => ApiError::Store(other),
        })?;

    let (token, expires_at) = state.tokens.issue(&account)?;

    info!("Registered account: {} ({})", account.username, account.role.as_str());
    metrics::counter!("roster_registrations_total").increment(1);

    Ok(Json(LoginResponse {
        token,
        username: account.username,
        role: account.role.as_str().to_string(),
        expires_at,
    }))
}

/// GET /api/auth/me
///
/// Answers from the validated claims alone, without a store read.
async fn me(RequireAuth(user): RequireAuth) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role.as_str().to_string(),
    })
}

/// POST /api/auth/logout
///
/// Tokens cannot be revoked server-side; logout only confirms so the
/// client drops its copy.
async fn logout(RequireAuth(user): RequireAuth) -> Json<MessageResponse> {
    info!("Account {} logged out", user.username);

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
}
