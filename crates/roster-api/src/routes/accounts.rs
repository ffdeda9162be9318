//! Admin account management routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use roster_auth::hash_password;
use roster_store::{NewAccount, StoreError};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{self, RequireAdmin};
use super::types::{AccountResponse, RegisterRequest};

/// GET /api/admin/accounts (Admin only)
async fn list_accounts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.accounts.list().await?;

    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// POST /api/admin/accounts (Admin only)
///
/// Same validation as self-registration, but no token is issued for the
/// new account.
async fn create_account(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let username = auth::normalize(&request.username);
    let email = auth::normalize(&request.email);

    auth::validate_username(&username)?;
    auth::validate_password(&request.password, auth::MIN_REGISTER_PASSWORD_LENGTH)?;
    auth::validate_email(&email)?;
    let role = auth::parse_role(&request.role)?;

    debug!("Creating account: {}", username);

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

    info!("Created account: {} ({})", account.username, account.role.as_str());

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// PUT /api/admin/accounts/{id}/toggle-status (Admin only)
///
/// Deactivated accounts cannot log in; tokens already issued to them stay
/// valid until expiry.
async fn toggle_account_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.toggle_status(&id).await?;

    info!(
        "Account {} is now {}",
        account.username,
        if account.is_active { "active" } else { "inactive" }
    );

    Ok(Json(account.into()))
}

/// DELETE /api/admin/accounts/{id} (Admin only)
async fn delete_account(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!("Deleting account: {}", id);

    let deleted = state.accounts.delete(&id).await?;

    if deleted {
        info!("Deleted account: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Account: {}", id)))
    }
}

/// Create admin account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/accounts", get(list_accounts))
        .route("/api/admin/accounts", post(create_account))
        .route("/api/admin/accounts/{id}/toggle-status", put(toggle_account_status))
        .route("/api/admin/accounts/{id}", delete(delete_account))
}
