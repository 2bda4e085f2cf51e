//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::RecurringExpenseId,
    db::lock_connection,
    stores::TransactionStore,
    transaction::{NewTransaction, Transaction, create_transaction, exists_for_recurrence_in_window},
};

/// Stores transactions in a SQLite database.
///
/// The `(recurring_id, recurring_period)` uniqueness constraint on the
/// transaction table backs the [Error::Conflict] contract of [TransactionStore::insert].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn exists_for_recurrence_in_window(
        &self,
        recurring_id: RecurringExpenseId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<bool, Error> {
        let connection = lock_connection(&self.connection)?;

        exists_for_recurrence_in_window(recurring_id, start, end, &connection)
    }

    fn insert(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = lock_connection(&self.connection)?;

        create_transaction(transaction, &connection)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use time::macros::datetime;

    use crate::{
        Error,
        stores::TransactionStore,
        test_utils::get_test_connection,
        transaction::{RECURRING_CATEGORY, Transaction},
    };

    use super::SQLiteTransactionStore;

    #[test]
    fn insert_then_exists() {
        let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(get_test_connection())));
        let now = datetime!(2024-03-15 09:00 UTC);

        store
            .insert(
                Transaction::build("Gym", -50.0, now, RECURRING_CATEGORY)
                    .recurrence(1, "2024-03".to_owned()),
            )
            .unwrap();

        assert_eq!(
            store.exists_for_recurrence_in_window(
                1,
                datetime!(2024-03-01 00:00 UTC),
                datetime!(2024-03-31 23:59:59 UTC)
            ),
            Ok(true)
        );
    }

    #[test]
    fn second_insert_for_same_period_conflicts() {
        let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(get_test_connection())));
        let new_transaction = || {
            Transaction::build(
                "Gym",
                -50.0,
                datetime!(2024-03-15 09:00 UTC),
                RECURRING_CATEGORY,
            )
            .recurrence(1, "2024-03".to_owned())
        };

        store.insert(new_transaction()).unwrap();

        assert_eq!(store.insert(new_transaction()), Err(Error::Conflict));
    }
}
