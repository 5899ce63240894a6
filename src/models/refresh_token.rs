// Refresh Token Database Model for JWT Management
// Stores salted SHA-256 hashes of token JTIs so a database leak never
// exposes usable refresh tokens. Changing JTI_HASH_SALT invalidates all
// outstanding tokens.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::schema::refresh_tokens;

/// Refresh token database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = refresh_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub jti_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New refresh token for insertion
#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub jti_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Errors for refresh token operations
#[derive(thiserror::Error, Debug)]
pub enum RefreshTokenError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Token not found")]
    NotFound,

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Connection pool error")]
    Pool(String),
}

impl RefreshToken {
    fn jti_hash_salt() -> Vec<u8> {
        // Deterministic salt for unit tests that run without a config
        #[cfg(test)]
        {
            use std::panic;
            let result = panic::catch_unwind(|| crate::app_config::config().jti_hash_salt.clone());
            if result.is_err() {
                return b"test-only-jti-salt-never-use-in-production".to_vec();
            }
        }

        let config = crate::app_config::config();
        match &config.jti_hash_salt {
            Some(salt) => {
                if salt.len() < 32 && config.is_production() {
                    panic!(
                        "JTI_HASH_SALT must be at least 32 bytes in production, got {}",
                        salt.len()
                    );
                }
                salt.as_bytes().to_vec()
            },
            None => {
                panic!("JTI_HASH_SALT environment variable must be configured (openssl rand -base64 48)")
            },
        }
    }

    /// Salted SHA-256 hash of a JTI for storage and lookup
    pub fn hash_jti(jti: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(Self::jti_hash_salt());
        hasher.update(jti.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Store new refresh token hash in database
    pub async fn store(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        jti: &str,
        expires_at_val: DateTime<Utc>,
    ) -> Result<Self, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        let new_token = NewRefreshToken {
            user_id: user_id_val,
            jti_hash: Self::hash_jti(jti),
            issued_at: Utc::now(),
            expires_at: expires_at_val,
        };

        diesel::insert_into(refresh_tokens)
            .values(&new_token)
            .get_result::<RefreshToken>(conn)
            .await
            .map_err(RefreshTokenError::Database)
    }

    /// Validate a refresh token JTI: must exist, be unexpired and unrevoked.
    pub async fn validate(
        conn: &mut AsyncPgConnection,
        jti: &str,
    ) -> Result<Self, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        let hash = Self::hash_jti(jti);
        let token = refresh_tokens
            .filter(jti_hash.eq(&hash))
            .first::<RefreshToken>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => RefreshTokenError::NotFound,
                _ => RefreshTokenError::Database(e),
            })?;

        // The filter already matched on the hash; compare again in constant
        // time so lookup behavior cannot be used as a timing oracle.
        if token.jti_hash.as_bytes().ct_eq(hash.as_bytes()).unwrap_u8() != 1 {
            return Err(RefreshTokenError::NotFound);
        }

        if token.revoked_at.is_some() {
            return Err(RefreshTokenError::Revoked);
        }
        if token.expires_at < Utc::now() {
            return Err(RefreshTokenError::Expired);
        }

        Ok(token)
    }

    /// Revoke a single token by JTI
    pub async fn revoke(
        conn: &mut AsyncPgConnection,
        jti: &str,
        reason: &str,
    ) -> Result<usize, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        let now = Utc::now();
        diesel::update(refresh_tokens.filter(jti_hash.eq(Self::hash_jti(jti))))
            .set((
                revoked_at.eq(Some(now)),
                revoked_reason.eq(Some(reason.to_string())),
                updated_at.eq(now),
            ))
            .execute(conn)
            .await
            .map_err(RefreshTokenError::Database)
    }

    /// Revoke every outstanding token for a user (logout-all, account disable)
    pub async fn revoke_all_for_user(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        reason: &str,
    ) -> Result<usize, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        let now = Utc::now();
        diesel::update(
            refresh_tokens
                .filter(user_id.eq(user))
                .filter(revoked_at.is_null()),
        )
        .set((
            revoked_at.eq(Some(now)),
            revoked_reason.eq(Some(reason.to_string())),
            updated_at.eq(now),
        ))
        .execute(conn)
        .await
        .map_err(RefreshTokenError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_jti_deterministic() {
        let jti = "11111111-2222-3333-4444-555555555555";
        assert_eq!(RefreshToken::hash_jti(jti), RefreshToken::hash_jti(jti));
    }

    #[test]
    fn test_hash_jti_distinct_inputs() {
        let a = RefreshToken::hash_jti("jti-a");
        let b = RefreshToken::hash_jti("jti-b");
        assert_ne!(a, b);
        // SHA-256 hex digest
        assert_eq!(a.len(), 64);
    }
}
