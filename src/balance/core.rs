use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::{Error, transaction::get_transactions_total};

/// The starting balance that transactions are added to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSetting {
    /// The balance before any recorded transaction.
    pub initial: f64,
}

/// The current balance, i.e. the initial balance plus every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// The balance before any recorded transaction.
    pub initial: f64,
    /// The sum of all transaction amounts.
    pub transactions_total: f64,
    /// `initial + transactions_total`.
    pub balance: f64,
}

pub fn create_balance_setting_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // The CHECK keeps the table down to a single row.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS balance_setting (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            initial REAL NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Get the initial balance, zero if it has never been set.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_balance_setting(connection: &Connection) -> Result<BalanceSetting, Error> {
    let initial: Option<f64> = connection
        .query_row("SELECT initial FROM balance_setting WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(BalanceSetting {
        initial: initial.unwrap_or(0.0),
    })
}

/// Set the initial balance, creating the setting if needed.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidAmount] if `initial` is NaN or infinite,
/// - or [Error::SqlError] if the SQL query fails.
pub fn set_balance_setting(initial: f64, connection: &Connection) -> Result<BalanceSetting, Error> {
    if !initial.is_finite() {
        return Err(Error::InvalidAmount(initial));
    }

    connection.execute(
        "INSERT INTO balance_setting (id, initial) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET initial = excluded.initial",
        (initial,),
    )?;

    Ok(BalanceSetting { initial })
}

/// Get the initial balance together with the sum of all transactions.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL query fails.
pub fn get_balance_summary(connection: &Connection) -> Result<BalanceSummary, Error> {
    let BalanceSetting { initial } = get_balance_setting(connection)?;
    let transactions_total = get_transactions_total(connection)?;

    Ok(BalanceSummary {
        initial,
        transactions_total,
        balance: initial + transactions_total,
    })
}
