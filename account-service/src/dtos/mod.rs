//! Request and response bodies for the account endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /accounts/{id}/deposit` and `/withdraw`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AmountRequest {
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
}

/// Body of `POST /transfers`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_number: i64,
    pub to_account_number: i64,
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
}
