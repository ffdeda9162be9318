//! Request/Response DTOs for the roster API
//!
//! Wire field names are camelCase to match the original frontend contract.

use chrono::{DateTime, NaiveDate, Utc};
use roster_store::{Account, EmployeeRecord};
use roster_storage::StoredFile;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ==================== Auth Types ====================

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request, also accepted for admin account creation
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Login and registration response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

/// Authenticated caller, answered from token claims
#[derive(Serialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// Plain confirmation message
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== Account Types ====================

/// Account response (never carries the password hash)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            role: account.role.as_str().to_string(),
            created_at: account.created_at,
            last_login_at: account.last_login_at,
            is_active: account.is_active,
        }
    }
}

// ==================== Record Types ====================

/// Create employee record request
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "Place of birth is required"))]
    pub place_of_birth: String,
    #[validate(length(min = 1, max = 200, message = "Residence is required"))]
    pub residence: String,
    /// Only honored for Admin callers; everyone else owns what they create
    #[serde(default)]
    pub owner_account_id: Option<String>,
    #[serde(default)]
    pub certificate_file_name: Option<String>,
}

/// Full-replace employee record update
///
/// The body id must match the path id. A missing certificate clears the
/// stored one; ownership never changes through an update.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    pub id: i64,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "Place of birth is required"))]
    pub place_of_birth: String,
    #[validate(length(min = 1, max = 200, message = "Residence is required"))]
    pub residence: String,
    #[serde(default)]
    pub certificate_file_name: Option<String>,
}

/// Employee record response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub owner_account_id: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub residence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<EmployeeRecord> for RecordResponse {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            owner_account_id: record.owner_account_id,
            date_of_birth: record.date_of_birth,
            place_of_birth: record.place_of_birth,
            residence: record.residence,
            certificate_file_name: record.certificate_file_name,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ==================== File Types ====================

/// Upload result
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub original_name: String,
    pub size: u64,
    pub is_duplicate: bool,
    pub message: String,
}

/// Stored file metadata response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub file_name: String,
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
    pub owner_account_id: String,
}

impl From<StoredFile> for FileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            file_name: file.file_name,
            original_name: file.original_name,
            size: file.size,
            content_type: file.content_type,
            sha256: file.sha256,
            uploaded_at: file.uploaded_at,
            owner_account_id: file.owner_account_id,
        }
    }
}
