//! Account model and the errors raised by account operations.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use thiserror::Error;

/// A bank account. The balance is held in the smallest currency unit and is
/// never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: i64,
    pub balance: i64,
}

/// Errors raised by the account store and service.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Unknown account: {0}")]
    UnknownAccount(i64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    #[error("Insufficient funds in account {0}")]
    Overdraft(i64),

    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    /// Label used for the `status` dimension of operation metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownAccount(_) => "unknown_account",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::Overdraft(_) => "overdraft",
            Self::SameAccount(_) => "same_account",
            Self::Database(_) => "db_error",
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::UnknownAccount(_) => AppError::NotFound(anyhow!(err)),
            AccountError::InvalidAmount(_)
            | AccountError::Overdraft(_)
            | AccountError::SameAccount(_) => AppError::BadRequest(anyhow!(err)),
            AccountError::Database(e) => AppError::from(e),
        }
    }
}
