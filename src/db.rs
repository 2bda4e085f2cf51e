//! Database initialization and shared connection handling.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, balance::create_balance_setting_table, recurring::create_recurring_expense_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_recurring_expense_table(&transaction)?;
    create_balance_setting_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the lock on the shared database connection.
///
/// # Errors
/// Returns [Error::StoreUnavailable] if the lock was poisoned by a panicking thread.
pub fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|_| {
        tracing::error!("The database lock is poisoned");
        Error::StoreUnavailable("the database lock is poisoned".to_owned())
    })
}
