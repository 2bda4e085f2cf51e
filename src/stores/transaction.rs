//! Defines the transaction store trait.

use time::OffsetDateTime;

use crate::{
    Error,
    database_id::RecurringExpenseId,
    transaction::{NewTransaction, Transaction},
};

/// Handles the lookup and creation of materialized transactions.
pub trait TransactionStore {
    /// Whether a transaction for `recurring_id` is dated between `start` and
    /// `end` (inclusive).
    fn exists_for_recurrence_in_window(
        &self,
        recurring_id: RecurringExpenseId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<bool, Error>;

    /// Insert a new transaction into the store.
    ///
    /// # Errors
    /// Implementers must return [Error::Conflict] if a transaction with the same
    /// `(recurring_id, recurring_period)` already exists.
    fn insert(&self, transaction: NewTransaction) -> Result<Transaction, Error>;
}
