//! Roster API client

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::session::{SessionGuard, SessionState};

/// Request timeout for every API call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: String,
    password: String,
}

/// Successful login/registration response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

/// Registration input
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Caller identity as reported by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// Account summary from the admin listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Employee record as returned by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecordInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub owner_account_id: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub residence: String,
    pub certificate_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// New employee record input
///
/// `owner_account_id` is only honored for admin callers; the server
/// stamps everyone else as the owner of what they create.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecordRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_account_id: Option<String>,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub residence: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Extract the server's error message from a failed response
async fn error_message(response: Response) -> String {
    match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => "Unknown error".to_string(),
    }
}

fn api_error(status: StatusCode, message: String) -> ClientError {
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

// Mirrors the server's contract so bad input never leaves the client.
fn validate_login_input(username: &str, password: &str) -> Result<(), ClientError> {
    if username.is_empty() || password.is_empty() {
        return Err(ClientError::Validation(
            "Username and password are required".to_string(),
        ));
    }
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(ClientError::Validation(
            "Username must be between 3 and 50 characters".to_string(),
        ));
    }
    let len = password.chars().count();
    if !(6..=100).contains(&len) {
        return Err(ClientError::Validation(
            "Password must be between 6 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Roster API client
///
/// Wraps the HTTP API and a [`SessionGuard`]: login attempts are refused
/// locally while the guard is locked, tokens are attached only while
/// valid, and any 401 clears the session.
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<RwLock<SessionGuard>>,
}

impl ApiClient {
    /// Create a new client for a server base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        info!("Created roster client for {}", base_url);

        Ok(Self {
            base_url,
            client,
            session: Arc::new(RwLock::new(SessionGuard::new())),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// A token for an authenticated request, or `SessionExpired`
    async fn require_token(&self) -> Result<String, ClientError> {
        let session = self.session.read().await;
        session
            .valid_token()
            .map(String::from)
            .ok_or(ClientError::SessionExpired)
    }

    /// Drop the local session after the server rejected the token
    async fn handle_rejected_token(&self) -> ClientError {
        self.session.write().await.clear();
        ClientError::SessionExpired
    }

    /// Log in, updating the local session on both outcomes
    ///
    /// The lockout check runs before anything is sent; a locked client
    /// fails fast without network traffic.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let username = username.trim().to_lowercase();
        validate_login_input(&username, password)?;

        {
            let session = self.session.read().await;
            if let Some(remaining) = session.lockout_remaining() {
                return Err(ClientError::Locked(remaining));
            }
        }

        debug!("Login attempt for {}", username);

        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                username,
                password: password.to_string(),
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: LoginResponse = response.json().await?;
                let mut session = self.session.write().await;
                session.record_success();
                session.set_session(body.token.clone(), body.expires_at);
                info!("Logged in as {}", body.username);
                Ok(body)
            }
            StatusCode::UNAUTHORIZED => {
                let mut session = self.session.write().await;
                session.record_failure();
                warn!(
                    "Login rejected, {} attempts remaining",
                    session.remaining_attempts()
                );
                Err(ClientError::Unauthorized)
            }
            status => Err(api_error(status, error_message(response).await)),
        }
    }

    /// Register a new account; a success logs the client in
    pub async fn register(&self, request: RegisterRequest) -> Result<LoginResponse, ClientError> {
        let mut request = request;
        request.username = request.username.trim().to_lowercase();
        request.email = request.email.trim().to_lowercase();

        if request.username.is_empty()
            || request.email.is_empty()
            || request.password.is_empty()
            || request.role.is_empty()
        {
            return Err(ClientError::Validation("All fields are required".to_string()));
        }
        let len = request.username.chars().count();
        if !(3..=50).contains(&len) {
            return Err(ClientError::Validation(
                "Username must be between 3 and 50 characters".to_string(),
            ));
        }
        let len = request.password.chars().count();
        if !(8..=100).contains(&len) {
            return Err(ClientError::Validation(
                "Password must be between 8 and 100 characters".to_string(),
            ));
        }
        if !is_valid_email(&request.email) {
            return Err(ClientError::Validation("Invalid email address".to_string()));
        }
        if request.role != "Admin" && request.role != "User" {
            return Err(ClientError::Validation("Invalid role".to_string()));
        }

        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, error_message(response).await));
        }

        let body: LoginResponse = response.json().await?;
        let mut session = self.session.write().await;
        session.set_session(body.token.clone(), body.expires_at);
        info!("Registered and logged in as {}", body.username);
        Ok(body)
    }

    /// Who the server says we are
    pub async fn current_user(&self) -> Result<UserInfo, ClientError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(self.handle_rejected_token().await),
            status => Err(api_error(status, error_message(response).await)),
        }
    }

    /// List accounts (admin only)
    pub async fn list_accounts(&self) -> Result<Vec<AccountInfo>, ClientError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .get(self.url("/admin/accounts"))
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(self.handle_rejected_token().await),
            status => Err(api_error(status, error_message(response).await)),
        }
    }

    /// List employee records visible to the caller
    pub async fn list_records(&self) -> Result<Vec<EmployeeRecordInfo>, ClientError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .get(self.url("/users"))
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(self.handle_rejected_token().await),
            status => Err(api_error(status, error_message(response).await)),
        }
    }

    /// Create an employee record
    pub async fn create_record(
        &self,
        request: NewRecordRequest,
    ) -> Result<EmployeeRecordInfo, ClientError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .post(self.url("/users"))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(self.handle_rejected_token().await),
            status => Err(api_error(status, error_message(response).await)),
        }
    }

    /// Log out: tell the server best-effort, always clear local state
    pub async fn logout(&self) {
        let token = { self.session.read().await.token().map(String::from) };
        if let Some(token) = token {
            let result = self
                .client
                .post(self.url("/auth/logout"))
                .bearer_auth(token)
                .send()
                .await;
            if let Err(e) = result {
                warn!("Logout request failed: {}", e);
            }
        }
        self.session.write().await.clear();
    }

    pub async fn state(&self) -> SessionState {
        self.session.read().await.state()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.valid_token().is_some()
    }

    /// Login attempts left before the local lockout engages
    pub async fn remaining_attempts(&self) -> u32 {
        self.session.read().await.remaining_attempts()
    }

    /// Time until a locked client may try again
    pub async fn lockout_remaining(&self) -> Option<Duration> {
        self.session.read().await.lockout_remaining()
    }
}
