//! Credit ledger: the only writer of account balances.
//!
//! `try_debit` is a bounded optimistic loop over the repository's
//! compare-and-swap primitive. A lost race re-reads the balance and tries
//! again; running out of attempts is reported as `LedgerError::Conflict`,
//! which callers surface as a transient failure distinct from
//! `InsufficientCredits`.

use quill_types::account::AccountId;
use quill_types::error::LedgerError;
use tracing::{debug, warn};

use crate::repository::account::AccountRepository;

/// Default number of compare-and-swap attempts per debit.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub struct CreditLedger<A: AccountRepository> {
    accounts: A,
    max_attempts: u32,
}

impl<A: AccountRepository> CreditLedger<A> {
    pub fn new(accounts: A) -> Self {
        Self {
            accounts,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the retry bound. A value of zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    /// Debit `amount` credits, returning the new balance.
    ///
    /// Fails with `InsufficientCredits` without touching the balance when
    /// it cannot cover `amount`. Two concurrent debits never both succeed
    /// against a balance that covers only one of them.
    pub async fn try_debit(&self, account_id: &AccountId, amount: u32) -> Result<i64, LedgerError> {
        let amount_i = i64::from(amount);

        for attempt in 1..=self.max_attempts {
            let balance = self
                .accounts
                .get_balance(account_id)
                .await?
                .ok_or(LedgerError::AccountNotFound)?;

            if balance < amount_i {
                return Err(LedgerError::InsufficientCredits {
                    balance,
                    required: amount,
                });
            }

            let new_balance = balance - amount_i;
            if self
                .accounts
                .compare_and_swap_balance(account_id, balance, new_balance)
                .await?
            {
                debug!(account_id = %account_id, amount, new_balance, "Credits debited");
                return Ok(new_balance);
            }

            debug!(account_id = %account_id, attempt, "Balance changed underneath debit, retrying");
        }

        warn!(
            account_id = %account_id,
            attempts = self.max_attempts,
            "Debit abandoned after repeated conflicts"
        );
        Err(LedgerError::Conflict {
            attempts: self.max_attempts,
        })
    }

    pub async fn balance(&self, account_id: &AccountId) -> Result<i64, LedgerError> {
        self.accounts
            .get_balance(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound)
    }

    /// Provision an account with its opening balance if it is new.
    pub async fn ensure_account(
        &self,
        account_id: &AccountId,
        initial_credits: i64,
    ) -> Result<i64, LedgerError> {
        Ok(self
            .accounts
            .ensure_account(account_id, initial_credits.max(0))
            .await?)
    }
}
