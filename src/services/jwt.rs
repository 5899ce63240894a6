// JWT Token Generation Service with Diesel Integration
// HS256 access/refresh token pair; refresh JTIs persisted for revocation,
// access JTIs denylisted in Redis on logout.

use diesel_async::AsyncPgConnection;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use redis::AsyncCommands;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::config::PermissionConfig;
use crate::db::{DieselPool, RedisPool};
use crate::models::auth::{AccessTokenClaims, RefreshTokenClaims};
use crate::models::refresh_token::{RefreshToken, RefreshTokenError};
use crate::models::user::{User, UserError};

// Error types for JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(String),

    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Database error: {0}")]
    DatabaseError(#[from] RefreshTokenError),

    #[error("User error: {0}")]
    UserError(#[from] UserError),

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Pool error: {0}")]
    PoolError(String),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken => JwtError::InvalidToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

// JWT Configuration with separate keys for access and refresh tokens
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry: u64,
    pub refresh_token_expiry: u64,
    pub algorithm: Algorithm,

    // JWT validation settings
    pub audience: String,
    pub issuer: String,

    // Separate keys for access tokens
    pub access_encoding_key: EncodingKey,
    pub access_decoding_key: DecodingKey,

    // Separate keys for refresh tokens
    pub refresh_encoding_key: EncodingKey,
    pub refresh_decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("access_encoding_key", &"<redacted>")
            .field("access_decoding_key", &"<redacted>")
            .field("refresh_encoding_key", &"<redacted>")
            .field("refresh_decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    /// Build JWT config from provided parameters - shared logic for from_env and for_test
    fn build_from_params(
        access_secret: String,
        refresh_secret: String,
        access_expiry: u64,
        refresh_expiry: u64,
        audience: String,
        issuer: String,
    ) -> Self {
        let access_encoding_key = EncodingKey::from_secret(access_secret.as_bytes());
        let access_decoding_key = DecodingKey::from_secret(access_secret.as_bytes());

        let refresh_encoding_key = EncodingKey::from_secret(refresh_secret.as_bytes());
        let refresh_decoding_key = DecodingKey::from_secret(refresh_secret.as_bytes());

        JwtConfig {
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
            algorithm: Algorithm::HS256,
            audience,
            issuer,
            access_encoding_key,
            access_decoding_key,
            refresh_encoding_key,
            refresh_decoding_key,
        }
    }

    /// Create JWT config from centralized app configuration
    pub fn from_env() -> Result<Self, JwtError> {
        let crate::app_config::JwtConfig {
            access_secret,
            refresh_secret,
            access_expiry,
            refresh_expiry,
            audience,
            issuer,
        } = &crate::CONFIG.jwt;

        Ok(Self::build_from_params(
            access_secret.clone(),
            refresh_secret.clone(),
            *access_expiry,
            *refresh_expiry,
            audience.clone(),
            issuer.clone(),
        ))
    }

    /// Create JWT config for tests without using lazy static
    #[cfg(test)]
    pub fn for_test() -> Self {
        Self::build_from_params(
            "test-access-secret-hs256".to_string(),
            "test-refresh-secret-hs256".to_string(),
            3600,   // 1 hour
            604800, // 7 days
            "test.linkmart.io".to_string(),
            "test.linkmart.io".to_string(),
        )
    }
}

// JWT Service with Diesel database integration
pub struct JwtService {
    config: JwtConfig,
    db_pool: Option<DieselPool>,
    redis_pool: Option<RedisPool>,
}

impl JwtService {
    /// Create new JWT service with configuration
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config,
            db_pool: None,
            redis_pool: None,
        }
    }

    /// Create new JWT service with full integration (Diesel + Redis)
    pub fn new_with_full_integration(
        config: JwtConfig,
        db_pool: DieselPool,
        redis_pool: RedisPool,
    ) -> Self {
        Self {
            config,
            db_pool: Some(db_pool),
            redis_pool: Some(redis_pool),
        }
    }

    /// Create from environment with database and Redis pools
    pub fn from_env_with_diesel(
        db_pool: DieselPool,
        redis_pool: RedisPool,
    ) -> Result<Self, JwtError> {
        let config = JwtConfig::from_env()?;
        Ok(Self::new_with_full_integration(config, db_pool, redis_pool))
    }

    async fn get_db_connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, diesel_async::pooled_connection::AsyncDieselConnectionManager<AsyncPgConnection>>, JwtError>
    {
        let pool = self.db_pool.as_ref().ok_or_else(|| {
            JwtError::PoolError("Database pool not configured".to_string())
        })?;

        pool.get()
            .await
            .map_err(|e| JwtError::PoolError(e.to_string()))
    }

    /// Generate access token carrying the user's role and derived scopes
    pub fn generate_access_token(&self, user: &User) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::KeyGenerationError(e.to_string()))?
            .as_secs();

        let role = user.role_enum();
        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            role: role.as_str().to_string(),
            scope: PermissionConfig::scopes_for_role(role),
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
            iat: now,
            exp: now + self.config.access_token_expiry,
        };

        let header = Header::new(self.config.algorithm);
        encode(&header, &claims, &self.config.access_encoding_key).map_err(Into::into)
    }

    /// Generate refresh token with database storage
    pub async fn generate_refresh_token(&self, user_id: &str) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::KeyGenerationError(e.to_string()))?
            .as_secs();

        let jti = Uuid::new_v4().to_string();

        let claims = RefreshTokenClaims {
            sub: user_id.to_string(),
            jti: jti.clone(),
            iat: now,
            exp: now + self.config.refresh_token_expiry,
        };

        // Store in database if pool is available
        if self.db_pool.is_some() {
            let mut conn = self.get_db_connection().await?;
            let expires_at = chrono::Utc::now()
                + chrono::Duration::seconds(self.config.refresh_token_expiry as i64);
            RefreshToken::store(
                &mut conn,
                Uuid::parse_str(user_id).map_err(|_| JwtError::InvalidToken)?,
                &jti,
                expires_at,
            )
            .await?;
        }

        let header = Header::new(self.config.algorithm);
        encode(&header, &claims, &self.config.refresh_encoding_key).map_err(Into::into)
    }

    /// Validates an access token and returns the decoded claims.
    /// Expiry is checked with zero leeway.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data =
            decode::<AccessTokenClaims>(token, &self.config.access_decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Validate refresh token with database check
    pub async fn validate_refresh_token(
        &self,
        token: &str,
    ) -> Result<RefreshTokenClaims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data =
            decode::<RefreshTokenClaims>(token, &self.config.refresh_decoding_key, &validation)
                .map_err(|e| match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::InvalidToken,
                    _ => JwtError::EncodingError(e.to_string()),
                })?;

        // Validate against database if pool is available
        if self.db_pool.is_some() {
            let mut conn = self.get_db_connection().await?;

            RefreshToken::validate(&mut conn, &token_data.claims.jti)
                .await
                .map_err(|e| match e {
                    RefreshTokenError::Expired => JwtError::TokenExpired,
                    RefreshTokenError::Revoked => JwtError::TokenRevoked,
                    RefreshTokenError::NotFound => JwtError::InvalidToken,
                    _ => JwtError::DatabaseError(e),
                })?;
        }

        Ok(token_data.claims)
    }

    /// Refresh tokens with rotation: the presented refresh token is revoked
    /// and a new access/refresh pair is issued.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<(String, String), JwtError> {
        let claims = self
            .validate_refresh_token(refresh_token)
            .await
            .map_err(|e| match e {
                JwtError::TokenExpired => JwtError::TokenExpired,
                JwtError::TokenRevoked => JwtError::TokenRevoked,
                _ => JwtError::InvalidToken,
            })?;

        let user = {
            let mut conn = self.get_db_connection().await?;
            let user_id = Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)?;
            User::find_by_id(&mut conn, user_id)
                .await
                .map_err(|e| match e {
                    UserError::NotFound => JwtError::InvalidToken,
                    _ => JwtError::UserError(e),
                })?
        };

        // Disabled accounts cannot mint new tokens
        if !user.is_active {
            return Err(JwtError::TokenRevoked);
        }

        // Revoke old refresh token
        {
            let mut conn = self.get_db_connection().await?;
            RefreshToken::revoke(&mut conn, &claims.jti, "rotated")
                .await
                .map_err(JwtError::DatabaseError)?;
        }

        let access_token = self.generate_access_token(&user)?;
        let refresh_token = self.generate_refresh_token(&user.id.to_string()).await?;

        Ok((access_token, refresh_token))
    }

    /// Logout token - denylist access JTI in Redis until its natural expiry
    pub async fn logout_token(&self, jti: &str, ttl_seconds: u64) -> Result<(), JwtError> {
        if let Some(redis_pool) = &self.redis_pool {
            let mut conn = redis_pool.connection();

            let key = format!("denylist:token:{}", jti);
            conn.set_ex::<_, _, ()>(key, "1", ttl_seconds)
                .await
                .map_err(|e| JwtError::PoolError(e.to_string()))?;
        }
        Ok(())
    }

    /// Check if access token is denylisted
    pub async fn is_token_denylisted(&self, jti: &str) -> Result<bool, JwtError> {
        if let Some(redis_pool) = &self.redis_pool {
            let mut conn = redis_pool.connection();

            let key = format!("denylist:token:{}", jti);
            let exists: bool = conn
                .exists(&key)
                .await
                .map_err(|e| JwtError::PoolError(e.to_string()))?;
            Ok(exists)
        } else {
            Ok(false)
        }
    }

    /// Revoke all user refresh tokens (logout-all, account disable)
    pub async fn revoke_all_user_tokens(
        &self,
        user_id: &str,
        reason: &str,
    ) -> Result<usize, JwtError> {
        if self.db_pool.is_some() {
            let mut conn = self.get_db_connection().await?;
            let user_uuid = Uuid::parse_str(user_id).map_err(|_| JwtError::InvalidToken)?;
            Ok(RefreshToken::revoke_all_for_user(&mut conn, user_uuid, reason).await?)
        } else {
            Ok(0)
        }
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(role: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", role),
            password_hash: "hash".to_string(),
            full_name: "Test User".to_string(),
            role: role.to_string(),
            phone: None,
            is_active: true,
            wallet_balance_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = JwtService::new(JwtConfig::for_test());
        let user = test_user("manager");

        let token = service
            .generate_access_token(&user)
            .expect("token generation");
        let claims = service
            .validate_access_token(&token)
            .expect("token validation");

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "manager");
        assert_eq!(claims.aud, "test.linkmart.io");
        assert!(claims.scope.contains(&"tasks:approve".to_string()));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = JwtService::new(JwtConfig::for_test());
        let user = test_user("blogger");

        let mut token = service
            .generate_access_token(&user)
            .expect("token generation");
        // Flip a character in the signature segment
        token.pop();
        token.push('x');

        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let service = JwtService::new(JwtConfig::for_test());
        let other = JwtService::new(JwtConfig::build_from_params(
            "completely-different-access-secret!!".to_string(),
            "completely-different-refresh-secret!".to_string(),
            3600,
            604800,
            "test.linkmart.io".to_string(),
            "test.linkmart.io".to_string(),
        ));

        let token = other
            .generate_access_token(&test_user("writer"))
            .expect("token generation");

        assert!(service.validate_access_token(&token).is_err());
    }
}
