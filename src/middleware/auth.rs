// Authenticated user context injected by the auth middleware

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::user::Role;

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token_id: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub exp: u64,
}

impl AuthenticatedUser {
    /// Role as enum; tokens are minted from the Role enum so this only
    /// fails on a forged or stale token.
    pub fn role_enum(&self) -> Option<Role> {
        Role::from_str(&self.role).ok()
    }

    /// Parse the subject into a Uuid
    pub fn user_uuid(&self) -> Option<uuid::Uuid> {
        uuid::Uuid::parse_str(&self.user_id).ok()
    }
}
