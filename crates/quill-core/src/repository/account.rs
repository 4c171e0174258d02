//! AccountRepository trait definition.
//!
//! The balance is the hottest piece of shared mutable state, so the trait
//! exposes a compare-and-swap primitive instead of a plain setter. The
//! `CreditLedger` builds its check-then-debit loop on top of it.

use quill_types::account::AccountId;
use quill_types::error::RepositoryError;

pub trait AccountRepository: Send + Sync {
    /// Create the account row with `initial_credits` if it does not exist yet.
    ///
    /// Returns the current balance. Never modifies an existing balance.
    fn ensure_account(
        &self,
        account_id: &AccountId,
        initial_credits: i64,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    fn get_balance(
        &self,
        account_id: &AccountId,
    ) -> impl std::future::Future<Output = Result<Option<i64>, RepositoryError>> + Send;

    /// Set the balance to `new` only if it currently equals `expected`.
    ///
    /// Returns `false` when the stored balance moved in the meantime.
    fn compare_and_swap_balance(
        &self,
        account_id: &AccountId,
        expected: i64,
        new: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
