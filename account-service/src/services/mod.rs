pub mod accounts;
pub mod database;
pub mod metrics;

pub use accounts::AccountService;
pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
