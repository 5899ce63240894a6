// Authentication models - JWT claims structures

use serde::{Deserialize, Serialize};

/// Access token claims structure
/// Carries the user's role so route guards never need a database round trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// JWT ID for token revocation (UUID format)
    pub jti: String,

    /// User email address
    pub email: String,

    /// Account role (admin, manager, team, writer, blogger)
    pub role: String,

    /// Token scope/permissions derived from the role
    pub scope: Vec<String>,

    /// Audience (aud)
    pub aud: String,

    /// Issuer (iss)
    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

/// Refresh token claims structure
/// Contains minimal information for token refresh and revocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// JWT ID for token revocation (UUID format)
    pub jti: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

impl AccessTokenClaims {
    /// Create new access token claims
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        token_id: String,
        email: String,
        role: String,
        scope: Vec<String>,
        audience: String,
        issuer: String,
        issued_at: u64,
        expires_at: u64,
    ) -> Self {
        Self {
            sub: user_id,
            jti: token_id,
            email,
            role,
            scope,
            aud: audience,
            iss: issuer,
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.exp < now
    }
}

impl RefreshTokenClaims {
    /// Create new refresh token claims
    pub fn new(user_id: String, token_id: String, issued_at: u64, expires_at: u64) -> Self {
        Self {
            sub: user_id,
            jti: token_id,
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.exp < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_access_token_claims_structure() {
        let jti = Uuid::new_v4().to_string();
        let claims = AccessTokenClaims::new(
            "user-123".to_string(),
            jti.clone(),
            "manager@example.com".to_string(),
            "manager".to_string(),
            vec!["tasks:approve".to_string(), "orders:create".to_string()],
            "linkmart.io".to_string(),
            "linkmart.io".to_string(),
            1640995200,
            1640998800,
        );

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.role, "manager");
        assert_eq!(claims.aud, "linkmart.io");
        assert_eq!(claims.iat, 1640995200);
        assert_eq!(claims.exp, 1640998800);
    }

    #[test]
    fn test_access_token_serialization() {
        let claims = AccessTokenClaims::new(
            "user-789".to_string(),
            Uuid::new_v4().to_string(),
            "blogger@example.com".to_string(),
            "blogger".to_string(),
            vec!["sites:manage".to_string()],
            "linkmart.io".to_string(),
            "linkmart.io".to_string(),
            1640995200,
            1640998800,
        );

        let json = serde_json::to_string(&claims).expect("Should serialize");
        let deserialized: AccessTokenClaims =
            serde_json::from_str(&json).expect("Should deserialize");

        assert_eq!(claims, deserialized);
    }

    #[test]
    fn test_token_expiry_check() {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let expired_claims = RefreshTokenClaims::new(
            "user-expired".to_string(),
            Uuid::new_v4().to_string(),
            now - 3600,
            now - 1,
        );
        assert!(expired_claims.is_expired(), "Token should be expired");

        let valid_claims = RefreshTokenClaims::new(
            "user-valid".to_string(),
            Uuid::new_v4().to_string(),
            now,
            now + 3600,
        );
        assert!(!valid_claims.is_expired(), "Token should not be expired");
    }
}
