// Configuration modules for LinkMart Backend

pub mod permissions;
pub mod rate_limit;

pub use permissions::PermissionConfig;
pub use rate_limit::RateLimitingConfig;
