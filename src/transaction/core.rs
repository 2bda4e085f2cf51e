//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{RecurringExpenseId, TransactionId},
    period::PeriodWindow,
};

// ============================================================================
// MODELS
// ============================================================================

/// The category given to transactions that were materialized from a recurring expense.
pub const RECURRING_CATEGORY: &str = "Fixe";

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub label: String,
    /// The amount of money spent (negative) or earned (positive).
    pub amount: f64,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The category of the transaction, e.g. "Logement", "Transport", "Fixe".
    pub category: String,
    /// The recurring expense this transaction was materialized from, if any.
    ///
    /// This is a lookup key only, deleting the recurring expense leaves the
    /// transaction untouched.
    pub recurring_id: Option<RecurringExpenseId>,
    /// The period ("YYYY-MM" or "YYYY") the transaction was materialized for.
    pub recurring_period: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(label: &str, amount: f64, date: OffsetDateTime, category: &str) -> NewTransaction {
        NewTransaction {
            label: label.to_owned(),
            amount,
            date,
            category: category.to_owned(),
            recurring_id: None,
            recurring_period: None,
        }
    }
}

/// A transaction that has not been stored yet.
///
/// Create one with [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A text description of what the transaction was for.
    pub label: String,
    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income, negative values represent expenses.
    pub amount: f64,
    /// When the transaction happened.
    ///
    /// Stored as a UTC instant with whole-second precision.
    pub date: OffsetDateTime,
    /// The category of the transaction.
    pub category: String,
    /// The recurring expense this transaction is materialized from.
    pub recurring_id: Option<RecurringExpenseId>,
    /// The period key the transaction is materialized for.
    ///
    /// The database rejects a second transaction with the same
    /// `(recurring_id, recurring_period)`.
    pub recurring_period: Option<String>,
}

impl NewTransaction {
    /// Mark the transaction as the materialization of `recurring_id` for
    /// the period `period_key`.
    pub fn recurrence(mut self, recurring_id: RecurringExpenseId, period_key: String) -> Self {
        self.recurring_id = Some(recurring_id);
        self.recurring_period = Some(period_key);
        self
    }
}

/// The fields of a transaction that can be edited.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The new label.
    pub label: String,
    /// The new amount.
    pub amount: f64,
    /// The new date.
    pub date: OffsetDateTime,
    /// The new category.
    pub category: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// The insert is conditional: if a transaction already exists for the same
/// recurring expense and period, nothing is written.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the label or category is empty,
/// - [Error::InvalidAmount] if the amount is NaN or infinite,
/// - [Error::Conflict] if the recurring expense has already been materialized
///   for the period,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_fields(&transaction.label, transaction.amount, &transaction.category)?;

    connection
        .prepare(
            "INSERT INTO \"transaction\" (label, amount, date, category, recurring_id, recurring_period)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(recurring_id, recurring_period) DO NOTHING
             RETURNING id, label, amount, date, category, recurring_id, recurring_period",
        )?
        .query_row(
            (
                &transaction.label,
                transaction.amount,
                transaction.date.unix_timestamp(),
                &transaction.category,
                transaction.recurring_id,
                &transaction.recurring_period,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            // `DO NOTHING` returns no rows when the constraint was hit.
            rusqlite::Error::QueryReturnedNoRows => Error::Conflict,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::Conflict,
            error => error.into(),
        })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, label, amount, date, category, recurring_id, recurring_period
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve transactions, newest first.
///
/// If `window` is given, only transactions dated within it are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    window: Option<&PeriodWindow>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = unix_bounds(window);

    connection
        .prepare(
            "SELECT id, label, amount, date, category, recurring_id, recurring_period
             FROM \"transaction\"
             WHERE date BETWEEN ?1 AND ?2
             ORDER BY date DESC, id DESC",
        )?
        .query_map((start, end), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace the editable fields of the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::EmptyField] or [Error::InvalidAmount] if a field is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_fields(&update.label, update.amount, &update.category)?;

    let transaction = connection
        .prepare(
            "UPDATE \"transaction\"
             SET label = ?1, amount = ?2, date = ?3, category = ?4
             WHERE id = ?5
             RETURNING id, label, amount, date, category, recurring_id, recurring_period",
        )?
        .query_row(
            (
                &update.label,
                update.amount,
                update.date.unix_timestamp(),
                &update.category,
                id,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a [Error::NotFound] if `id` does not refer to a
/// valid transaction, or a [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Whether a transaction materialized from `recurring_id` is dated between
/// `start` and `end` (inclusive).
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn exists_for_recurrence_in_window(
    recurring_id: RecurringExpenseId,
    start: OffsetDateTime,
    end: OffsetDateTime,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM \"transaction\"
                WHERE recurring_id = ?1 AND date BETWEEN ?2 AND ?3
            )",
            (recurring_id, start.unix_timestamp(), end.unix_timestamp()),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Get the sum of all transaction amounts.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_total(connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"",
            [],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Dates are stored as unix timestamps so that range queries compare
    // instants rather than strings.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                amount REAL NOT NULL,
                date INTEGER NOT NULL,
                category TEXT NOT NULL,
                recurring_id INTEGER,
                recurring_period TEXT,
                UNIQUE(recurring_id, recurring_period)
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_recurring_date
         ON \"transaction\"(recurring_id, date);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let label = row.get(1)?;
    let amount = row.get(2)?;
    let timestamp: i64 = row.get(3)?;
    let date = OffsetDateTime::from_unix_timestamp(timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(error))
    })?;
    let category = row.get(4)?;
    let recurring_id = row.get(5)?;
    let recurring_period = row.get(6)?;

    Ok(Transaction {
        id,
        label,
        amount,
        date,
        category,
        recurring_id,
        recurring_period,
    })
}

fn validate_fields(label: &str, amount: f64, category: &str) -> Result<(), Error> {
    if label.trim().is_empty() {
        return Err(Error::EmptyField("label"));
    }

    if category.trim().is_empty() {
        return Err(Error::EmptyField("category"));
    }

    if !amount.is_finite() {
        return Err(Error::InvalidAmount(amount));
    }

    Ok(())
}

fn unix_bounds(window: Option<&PeriodWindow>) -> (i64, i64) {
    match window {
        Some(window) => (window.start.unix_timestamp(), window.end.unix_timestamp()),
        None => (i64::MIN, i64::MAX),
    }
}

// ============================================================================
// TESTS
// ============================================================================
