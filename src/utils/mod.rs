// Utility modules for LinkMart Backend

pub mod auth_errors;
pub mod pagination;
pub mod password;
pub mod service_error;
pub mod validation;

pub use auth_errors::{log_auth_failure, AuthError, AuthErrorResponse};
pub use pagination::{Paginated, Pagination};
pub use password::{hash_password, verify_password, PasswordError};
pub use service_error::ServiceError;
pub use validation::{require_reason, trim_and_validate_field, trim_optional_field};
