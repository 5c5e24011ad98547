//! Account handlers.
//!
//! Thin translation between JSON and [`AccountService`](crate::services::AccountService):
//! bodies are validated here, business rules live in the service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{AmountRequest, TransferRequest},
    models::Account,
    startup::AppState,
};

/// List all account numbers.
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<i64>>, AppError> {
    let numbers = state.accounts.get_all_account_numbers().await?;
    Ok(Json(numbers))
}

/// Get a single account.
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_number): Path<i64>,
) -> Result<Json<Account>, AppError> {
    tracing::debug!(account_number, "Fetching account");

    let account = state.accounts.get(account_number).await?;
    Ok(Json(account))
}

/// Deposit into an account.
pub async fn deposit(
    State(state): State<AppState>,
    Path(account_number): Path<i64>,
    Json(payload): Json<AmountRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    state.accounts.deposit(account_number, payload.amount).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Withdraw from an account and return the updated account.
pub async fn withdraw(
    State(state): State<AppState>,
    Path(account_number): Path<i64>,
    Json(payload): Json<AmountRequest>,
) -> Result<Json<Account>, AppError> {
    payload.validate()?;

    let account = state
        .accounts
        .withdraw(account_number, payload.amount)
        .await?;

    Ok(Json(account))
}

/// Transfer between two accounts.
pub async fn transfer(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    state
        .accounts
        .transfer(
            payload.from_account_number,
            payload.to_account_number,
            payload.amount,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete an account.
pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_number): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.accounts.delete_account(account_number).await?;
    Ok(StatusCode::NO_CONTENT)
}
