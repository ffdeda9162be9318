//! Store models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a stored string does not name a known variant
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidRole(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRole(s) => write!(f, "Invalid role: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Account role
///
/// Serialized exactly as `"Admin"` / `"User"` on the wire and inside
/// token claims.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "User" => Ok(Role::User),
            _ => Err(ParseError::InvalidRole(s.to_string())),
        }
    }
}

/// Account model
///
/// `username` and `email` are stored trimmed and lowercased; uniqueness
/// checks against them are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// New account (for insertion)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Employee record model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Id of the account that owns this record
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

/// New employee record (for insertion)
#[derive(Debug, Clone)]
pub struct NewEmployeeRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub owner_account_id: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub residence: String,
    pub certificate_file_name: Option<String>,
}

/// Update employee record (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployeeRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub owner_account_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub residence: Option<String>,
    pub certificate_file_name: Option<Option<String>>,
}

/// Visibility scope for record queries
///
/// Admin callers see every record; everyone else only the records whose
/// `owner_account_id` matches their own account. The scope is applied
/// inside the store, so out-of-scope records behave as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordScope {
    All,
    OwnedBy(String),
}

impl RecordScope {
    /// Build the scope for a caller given their role and account id.
    pub fn for_caller(role: Role, account_id: &str) -> Self {
        if role.is_admin() {
            RecordScope::All
        } else {
            RecordScope::OwnedBy(account_id.to_string())
        }
    }

    pub fn permits(&self, record: &EmployeeRecord) -> bool {
        match self {
            RecordScope::All => true,
            RecordScope::OwnedBy(owner) => record.owner_account_id == *owner,
        }
    }
}
