// Permission configuration for LinkMart Backend
// Maps each account role to the scopes embedded in its access tokens.
// Scopes are advisory for clients; route guards check the role itself.

use crate::models::user::Role;

pub struct PermissionConfig;

impl PermissionConfig {
    /// Scopes granted to a role, embedded in the JWT `scope` claim
    pub fn scopes_for_role(role: Role) -> Vec<String> {
        let scopes: &[&str] = match role {
            Role::Admin => &[
                "users:manage",
                "orders:read",
                "withdrawals:settle",
                "threads:participate",
            ],
            Role::Manager => &[
                "orders:create",
                "tasks:approve",
                "tasks:reject",
                "tasks:finalize",
                "sites:read",
                "threads:participate",
            ],
            Role::Team => &["sites:read", "tasks:submit", "threads:participate"],
            Role::Writer => &["tasks:write", "wallet:withdraw", "threads:participate"],
            Role::Blogger => &[
                "sites:manage",
                "tasks:publish",
                "wallet:withdraw",
                "threads:participate",
            ],
        };

        scopes.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_scopes() {
        let scopes = PermissionConfig::scopes_for_role(Role::Admin);
        assert!(scopes.contains(&"users:manage".to_string()));
        assert!(scopes.contains(&"withdrawals:settle".to_string()));
        assert!(!scopes.contains(&"tasks:approve".to_string()));
    }

    #[test]
    fn test_wallet_scopes_limited_to_earning_roles() {
        for role in [Role::Writer, Role::Blogger] {
            assert!(PermissionConfig::scopes_for_role(role)
                .contains(&"wallet:withdraw".to_string()));
        }
        for role in [Role::Admin, Role::Manager, Role::Team] {
            assert!(!PermissionConfig::scopes_for_role(role)
                .contains(&"wallet:withdraw".to_string()));
        }
    }

    #[test]
    fn test_every_role_can_open_threads() {
        for role in [
            Role::Admin,
            Role::Manager,
            Role::Team,
            Role::Writer,
            Role::Blogger,
        ] {
            assert!(PermissionConfig::scopes_for_role(role)
                .contains(&"threads:participate".to_string()));
        }
    }
}
