//! Session Token Service
//!
//! Issues and validates session JWTs (HS256). The resolved role set is
//! carried in the claims so downstream authorization checks never re-read
//! the permission graph within a session.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::provider::AuthenticatedUser;
use crate::shared::error::{AdminError, Result};

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID
    pub jti: String,

    /// Display name
    pub name: String,

    /// Resolved roles ("USER", "ADMIN", "ROLE_<NAME>")
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Configuration for the session service
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret for HS256 signing
    pub secret_key: String,

    /// Token issuer
    pub issuer: String,

    /// Session lifetime in seconds
    pub session_ttl_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: "gatehouse".to_string(),
            session_ttl_secs: 28800, // 8 hours
        }
    }
}

/// Session token service
pub struct SessionService {
    config: SessionConfig,
}

impl SessionService {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Issue a session token for an authenticated user.
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.user.id.clone(),
            iss: self.config.issuer.clone(),
            exp: (now + Duration::seconds(self.config.session_ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            name: user.user.nickname.clone(),
            roles: user.roles.iter().cloned().collect(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret_key.as_bytes()),
        )
        .map_err(|e| AdminError::internal(format!("Failed to sign session token: {}", e)))
    }

    /// Validate a session token and return its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.secret_key.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AdminError::TokenExpired,
            _ => AdminError::InvalidToken {
                message: e.to_string(),
            },
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::entity::User;
    use std::collections::BTreeSet;

    fn service() -> SessionService {
        SessionService::new(SessionConfig {
            secret_key: "test-secret".to_string(),
            ..SessionConfig::default()
        })
    }

    fn authenticated_user() -> AuthenticatedUser {
        let user = User::new("google", "g-123", "Alice");
        let mut roles = BTreeSet::new();
        roles.insert("USER".to_string());
        roles.insert("ROLE_REPORTS".to_string());
        AuthenticatedUser { user, roles }
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = service();
        let user = authenticated_user();

        let token = service.issue(&user).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, user.user.id);
        assert_eq!(claims.name, "Alice");
        assert!(claims.roles.contains(&"USER".to_string()));
        assert!(claims.roles.contains(&"ROLE_REPORTS".to_string()));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let service = service();
        assert!(service.validate("not-a-token").is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let user = authenticated_user();
        let token = service().issue(&user).unwrap();

        let other = SessionService::new(SessionConfig {
            secret_key: "different-secret".to_string(),
            ..SessionConfig::default()
        });
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
