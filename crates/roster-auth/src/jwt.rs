//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use roster_store::{Account, Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
///
/// Every field is required at decode time; a token missing any of them
/// fails validation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,
    /// Username
    pub name: String,
    /// Account email
    pub email: String,
    /// Account role ("Admin" / "User")
    pub role: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Authenticated caller, built from validated claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            username: claims.name.clone(),
            email: claims.email.clone(),
            // An unparseable role claim degrades to the weakest role
            role: claims.role.parse().unwrap_or(Role::User),
        }
    }
}

/// Token issuer for generation and validation
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    token_ttl_minutes: i64,
}

impl TokenIssuer {
    /// Create a new token issuer
    pub fn new(secret: &str, issuer: &str, audience: &str, token_ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            token_ttl_minutes,
        }
    }

    /// Issue a signed token for an account, returning it with its expiry
    pub fn issue(&self, account: &Account) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.token_ttl_minutes);

        let claims = Claims {
            sub: account.id.clone(),
            name: account.username.clone(),
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing token for account: {}", account.username);

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok((token, exp))
    }

    /// Validate a token and return its claims
    ///
    /// Signature, issuer, audience and expiry are all checked with zero
    /// clock-skew tolerance. Any failure yields `None`; callers never
    /// learn which check rejected the token.
    pub fn validate(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Token validation failed: {}", e);
                None
            }
        }
    }
}
