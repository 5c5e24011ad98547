//! Account business operations.
//!
//! Every operation runs in exactly one database transaction. Amounts are
//! validated before any statement runs; unknown accounts and overdrafts are
//! detected by the statements themselves, after which the transaction is
//! rolled back so no partial update survives.

use crate::models::{Account, AccountError};
use crate::services::database::{self, Database};
use crate::services::metrics::record_operation;
use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Look up an account.
    #[instrument(skip(self))]
    pub async fn get(&self, account_number: i64) -> Result<Account, AccountError> {
        let mut tx = self.db.begin().await?;
        let result = database::find_account(&mut tx, account_number)
            .await
            .and_then(|found| found.ok_or(AccountError::UnknownAccount(account_number)));
        finish("get", tx, result).await
    }

    /// Credit an account.
    #[instrument(skip(self))]
    pub async fn deposit(&self, account_number: i64, amount: i64) -> Result<Account, AccountError> {
        if let Err(e) = ensure_positive(amount) {
            record_operation("deposit", e.kind());
            return Err(e);
        }

        let mut tx = self.db.begin().await?;
        let result = credit(&mut tx, account_number, amount).await;
        let account = finish("deposit", tx, result).await?;

        info!(account_number, amount, balance = account.balance, "Deposit applied");
        Ok(account)
    }

    /// Debit an account. Fails with [`AccountError::Overdraft`] rather than
    /// let the balance go negative.
    #[instrument(skip(self))]
    pub async fn withdraw(&self, account_number: i64, amount: i64) -> Result<Account, AccountError> {
        if let Err(e) = ensure_positive(amount) {
            record_operation("withdraw", e.kind());
            return Err(e);
        }

        let mut tx = self.db.begin().await?;
        let result = debit(&mut tx, account_number, amount).await;
        let account = finish("withdraw", tx, result).await?;

        info!(account_number, amount, balance = account.balance, "Withdrawal applied");
        Ok(account)
    }

    /// Move `amount` from one account to another. Both legs commit together or
    /// not at all.
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        from_account: i64,
        to_account: i64,
        amount: i64,
    ) -> Result<(), AccountError> {
        let precheck = ensure_positive(amount).and_then(|_| {
            if from_account == to_account {
                Err(AccountError::SameAccount(from_account))
            } else {
                Ok(())
            }
        });
        if let Err(e) = precheck {
            record_operation("transfer", e.kind());
            return Err(e);
        }

        let mut tx = self.db.begin().await?;
        let result = async {
            let from = debit(&mut tx, from_account, amount).await?;
            let to = credit(&mut tx, to_account, amount).await?;
            Ok::<_, AccountError>((from, to))
        }
        .await;
        let (from, to) = finish("transfer", tx, result).await?;

        info!(
            from_account,
            to_account,
            amount,
            from_balance = from.balance,
            to_balance = to.balance,
            "Transfer applied"
        );
        Ok(())
    }

    /// Remove an account.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, account_number: i64) -> Result<(), AccountError> {
        let mut tx = self.db.begin().await?;
        let result = database::delete_account(&mut tx, account_number)
            .await
            .and_then(|deleted| {
                if deleted {
                    Ok(())
                } else {
                    Err(AccountError::UnknownAccount(account_number))
                }
            });
        finish("delete", tx, result).await?;

        info!(account_number, "Account deleted");
        Ok(())
    }

    /// Every known account number, ascending.
    #[instrument(skip(self))]
    pub async fn get_all_account_numbers(&self) -> Result<Vec<i64>, AccountError> {
        let mut tx = self.db.begin().await?;
        let result = database::list_account_numbers(&mut tx).await;
        finish("list", tx, result).await
    }
}

fn ensure_positive(amount: i64) -> Result<(), AccountError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(AccountError::InvalidAmount(amount))
    }
}

async fn credit(
    tx: &mut Transaction<'static, Sqlite>,
    account_number: i64,
    amount: i64,
) -> Result<Account, AccountError> {
    if let Some(account) = database::adjust_balance(tx, account_number, amount).await? {
        return Ok(account);
    }

    // No row changed: either the account is missing or the sum overflows
    match database::find_account(tx, account_number).await? {
        Some(_) => Err(AccountError::InvalidAmount(amount)),
        None => Err(AccountError::UnknownAccount(account_number)),
    }
}

async fn debit(
    tx: &mut Transaction<'static, Sqlite>,
    account_number: i64,
    amount: i64,
) -> Result<Account, AccountError> {
    database::adjust_balance(tx, account_number, -amount)
        .await?
        .ok_or(AccountError::UnknownAccount(account_number))
}

/// Commit on success, roll back on failure, and record the outcome.
async fn finish<T>(
    operation: &'static str,
    tx: Transaction<'static, Sqlite>,
    result: Result<T, AccountError>,
) -> Result<T, AccountError> {
    let outcome = match result {
        Ok(value) => tx.commit().await.map(|_| value).map_err(AccountError::from),
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(operation, error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    };

    match &outcome {
        Ok(_) => record_operation(operation, "ok"),
        Err(e) => record_operation(operation, e.kind()),
    }

    outcome
}
