//! SQLite account repository implementation.
//!
//! The balance compare-and-swap is a single conditional UPDATE, so two
//! concurrent debits that read the same balance cannot both commit.

use chrono::Utc;
use quill_core::repository::account::AccountRepository;
use quill_types::account::AccountId;
use quill_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, query_error};

#[derive(Clone)]
pub struct SqliteAccountRepository {
    pool: DatabasePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub async fn count_accounts(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(count as u64)
    }
}

impl AccountRepository for SqliteAccountRepository {
    async fn ensure_account(
        &self,
        account_id: &AccountId,
        initial_credits: i64,
    ) -> Result<i64, RepositoryError> {
        let now = format_datetime(&Utc::now());
        sqlx::query(
            r#"INSERT INTO accounts (id, credits, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(id) DO NOTHING"#,
        )
        .bind(account_id.to_string())
        .bind(initial_credits.max(0))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        // Read back on the writer so the row just inserted is visible.
        let (credits,): (i64,) = sqlx::query_as("SELECT credits FROM accounts WHERE id = ?")
            .bind(account_id.to_string())
            .fetch_one(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(credits)
    }

    async fn get_balance(&self, account_id: &AccountId) -> Result<Option<i64>, RepositoryError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT credits FROM accounts WHERE id = ?")
            .bind(account_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.map(|(credits,)| credits))
    }

    async fn compare_and_swap_balance(
        &self,
        account_id: &AccountId,
        expected: i64,
        new: i64,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE accounts SET credits = ?, updated_at = ? WHERE id = ? AND credits = ?",
        )
        .bind(new)
        .bind(format_datetime(&Utc::now()))
        .bind(account_id.to_string())
        .bind(expected)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quill_core::ledger::CreditLedger;
    use quill_types::error::LedgerError;

    use super::*;
    use crate::sqlite::test_pool;

    #[tokio::test]
    async fn test_ensure_account_is_idempotent() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        let account = AccountId::new();

        assert_eq!(repo.ensure_account(&account, 1000).await.unwrap(), 1000);
        repo.compare_and_swap_balance(&account, 1000, 990).await.unwrap();
        // A second ensure never resets the balance.
        assert_eq!(repo.ensure_account(&account, 1000).await.unwrap(), 990);
        assert_eq!(repo.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_balance_unknown_account() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        assert!(repo.get_balance(&AccountId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_compare_and_swap_rejects_stale_expectation() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        let account = AccountId::new();
        repo.ensure_account(&account, 15).await.unwrap();

        assert!(repo.compare_and_swap_balance(&account, 15, 5).await.unwrap());
        assert!(!repo.compare_and_swap_balance(&account, 15, 5).await.unwrap());
        assert_eq!(repo.get_balance(&account).await.unwrap(), Some(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraw() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        let account = AccountId::new();
        repo.ensure_account(&account, 35).await.unwrap();
        let ledger = Arc::new(CreditLedger::new(repo.clone()).with_max_attempts(16));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move { ledger.try_debit(&account, 10).await })
            })
            .collect();

        let mut succeeded = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(LedgerError::InsufficientCredits { .. }) => {}
                Err(other) => panic!("unexpected ledger error: {other}"),
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(repo.get_balance(&account).await.unwrap(), Some(5));
    }
}
