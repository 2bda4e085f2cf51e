//! In-memory store fakes for exercising the materialization job without SQLite.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::RecurringExpenseId,
    recurring::{Interval, RecurringExpense},
    stores::{RecurrenceStore, TransactionStore},
    transaction::{NewTransaction, Transaction},
};

/// Returns every definition it holds, leaving eligibility to the caller.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryRecurrenceStore {
    pub definitions: Vec<RecurringExpense>,
    /// Rows that cannot be read, reported as [Error::MalformedDefinition].
    pub unreadable: Vec<RecurringExpenseId>,
    pub unavailable: bool,
}

impl InMemoryRecurrenceStore {
    pub fn new(definitions: Vec<RecurringExpense>) -> Self {
        Self {
            definitions,
            ..Default::default()
        }
    }
}

impl RecurrenceStore for InMemoryRecurrenceStore {
    fn list_active(
        &self,
        _interval: Interval,
        _first_day: Date,
        _last_day: Date,
    ) -> Result<Vec<Result<RecurringExpense, Error>>, Error> {
        if self.unavailable {
            return Err(Error::StoreUnavailable("fake store is offline".to_owned()));
        }

        let unreadable = self.unreadable.iter().map(|&id| {
            Err(Error::MalformedDefinition(
                id,
                "could not read amount".to_owned(),
            ))
        });

        Ok(self
            .definitions
            .iter()
            .cloned()
            .map(Ok)
            .chain(unreadable)
            .collect())
    }
}

/// Keeps transactions in a vector and enforces the same
/// `(recurring_id, recurring_period)` uniqueness as the SQLite store.
///
/// Clones share the same transactions, so a test can keep a handle after
/// moving the store into a job.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryTransactionStore {
    pub transactions: Arc<Mutex<Vec<Transaction>>>,
    /// Inserts for these recurring expenses fail with an SQL error.
    pub failing_inserts: HashSet<RecurringExpenseId>,
    /// Every existence check reports no match, as if a concurrent run had
    /// not committed yet.
    pub blind_existence_checks: bool,
    /// Every call fails with [Error::StoreUnavailable].
    pub unavailable: bool,
}

impl InMemoryTransactionStore {
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap().clone()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn exists_for_recurrence_in_window(
        &self,
        recurring_id: RecurringExpenseId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<bool, Error> {
        if self.unavailable {
            return Err(Error::StoreUnavailable("fake store is offline".to_owned()));
        }

        if self.blind_existence_checks {
            return Ok(false);
        }

        Ok(self.transactions.lock().unwrap().iter().any(|transaction| {
            transaction.recurring_id == Some(recurring_id)
                && start <= transaction.date
                && transaction.date <= end
        }))
    }

    fn insert(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        if self.unavailable {
            return Err(Error::StoreUnavailable("fake store is offline".to_owned()));
        }

        if new_transaction
            .recurring_id
            .is_some_and(|recurring_id| self.failing_inserts.contains(&recurring_id))
        {
            return Err(Error::SqlError(rusqlite::Error::InvalidQuery));
        }

        let mut transactions = self.transactions.lock().unwrap();

        let is_duplicate = new_transaction.recurring_id.is_some()
            && transactions.iter().any(|transaction| {
                transaction.recurring_id == new_transaction.recurring_id
                    && transaction.recurring_period == new_transaction.recurring_period
            });
        if is_duplicate {
            return Err(Error::Conflict);
        }

        let transaction = Transaction {
            id: transactions.len() as i64 + 1,
            label: new_transaction.label,
            amount: new_transaction.amount,
            date: new_transaction.date,
            category: new_transaction.category,
            recurring_id: new_transaction.recurring_id,
            recurring_period: new_transaction.recurring_period,
        };
        transactions.push(transaction.clone());

        Ok(transaction)
    }
}
