pub mod accounts;
pub mod health;

pub use accounts::{delete_account, deposit, get_account, list_accounts, transfer, withdraw};
pub use health::{health_check, metrics, readiness_check};
