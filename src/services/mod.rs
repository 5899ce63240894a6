// Services module for LinkMart Backend
// Business logic layer for the application

pub mod jwt;
pub mod rate_limit;
pub mod thread;
pub mod wallet;
pub mod workflow;

// Re-export commonly used services
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use rate_limit::{RateLimitConfig, RateLimitError, RateLimitResult, RateLimitService};
pub use thread::{ThreadService, ThreadView};
pub use wallet::{WalletService, WalletSummary};
pub use workflow::{Actor, WorkflowService};
