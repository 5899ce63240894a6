pub mod assignment;
pub mod auth;
pub mod notification;
pub mod order;
pub mod refresh_token;
pub mod site;
pub mod thread;
pub mod user;
pub mod wallet;
pub mod withdrawal;

// Re-export common types
pub use assignment::{
    Assignment, AssignmentStatus, NewAssignment, TransitionError, WorkflowAction,
};
pub use auth::*;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use order::{NewOrder, Order, OrderType};
pub use refresh_token::*;
pub use site::{NewSite, Site, SiteUpdate};
pub use thread::{NewThread, NewThreadMessage, Thread, ThreadMessage, ThreadStatus};
pub use user::{NewUser, Role, User, UserError, UserUpdate};
pub use wallet::{NewWalletTransaction, TransactionKind, WalletTransaction};
pub use withdrawal::{NewWithdrawalRequest, PayoutMethod, WithdrawalRequest, WithdrawalStatus};
