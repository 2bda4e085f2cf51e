//! Defines the recurring expense model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::RecurringExpenseId};

// ============================================================================
// MODELS
// ============================================================================

/// The label given to materialized transactions when the recurring expense has
/// no description.
pub const DEFAULT_RECURRING_LABEL: &str = "Dépense récurrente";

/// How often a recurring expense produces a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Once per calendar month.
    Monthly,
    /// Once per calendar year.
    Annual,
}

impl Interval {
    /// The text used to store the interval in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            other => Err(Error::InvalidInterval(other.to_owned())),
        }
    }
}

/// A template for an expense (or income) that repeats every month or year,
/// e.g. rent or a gym membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    /// The ID of the recurring expense.
    pub id: RecurringExpenseId,
    /// What the expense is for. May be empty.
    pub description: String,
    /// The amount copied onto each materialized transaction. Negative for expenses.
    pub amount: f64,
    /// How often the expense recurs.
    pub interval: Interval,
    /// The first day the expense is active (inclusive).
    pub start_date: Date,
    /// The last day the expense is active (inclusive), `None` if it never ends.
    pub end_date: Option<Date>,
}

impl RecurringExpense {
    /// Create a new recurring expense.
    ///
    /// Shortcut for [RecurringExpenseBuilder] for discoverability.
    pub fn build(amount: f64, start_date: Date, interval: Interval) -> RecurringExpenseBuilder {
        RecurringExpenseBuilder {
            description: String::new(),
            amount,
            interval,
            start_date,
            end_date: None,
        }
    }

    /// The label for transactions materialized from this expense.
    pub fn label(&self) -> &str {
        if self.description.trim().is_empty() {
            DEFAULT_RECURRING_LABEL
        } else {
            &self.description
        }
    }

    /// Check the invariants that every stored recurring expense must hold.
    ///
    /// # Errors
    /// Returns [Error::MalformedDefinition] if the amount is not finite or the
    /// end date is before the start date.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() {
            return Err(Error::MalformedDefinition(
                self.id,
                format!("{} is not a valid amount", self.amount),
            ));
        }

        match self.end_date {
            Some(end_date) if end_date < self.start_date => Err(Error::MalformedDefinition(
                self.id,
                format!(
                    "the end date {end_date} is before the start date {}",
                    self.start_date
                ),
            )),
            _ => Ok(()),
        }
    }
}

/// A builder for creating [RecurringExpense] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringExpenseBuilder {
    /// What the expense is for. Empty descriptions fall back to
    /// [DEFAULT_RECURRING_LABEL] when materialized.
    pub description: String,
    /// The signed amount, negative for expenses.
    pub amount: f64,
    /// How often the expense recurs.
    pub interval: Interval,
    /// The first day the expense is active.
    pub start_date: Date,
    /// The last day the expense is active, `None` for open-ended expenses.
    pub end_date: Option<Date>,
}

impl RecurringExpenseBuilder {
    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the end date.
    pub fn end_date(mut self, end_date: Option<Date>) -> Self {
        self.end_date = end_date;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new recurring expense in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is NaN or infinite,
/// - [Error::InvalidDateRange] if the end date is before the start date,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_recurring_expense(
    builder: RecurringExpenseBuilder,
    connection: &Connection,
) -> Result<RecurringExpense, Error> {
    if !builder.amount.is_finite() {
        return Err(Error::InvalidAmount(builder.amount));
    }

    match builder.end_date {
        Some(end_date) if end_date < builder.start_date => {
            return Err(Error::InvalidDateRange {
                start: builder.start_date,
                end: end_date,
            });
        }
        _ => {}
    }

    let id = connection
        .prepare(
            "INSERT INTO recurring_expense (description, amount, frequency, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )?
        .query_row(
            (
                &builder.description,
                builder.amount,
                builder.interval.as_str(),
                builder.start_date,
                builder.end_date,
            ),
            |row| row.get(0),
        )?;

    Ok(RecurringExpense {
        id,
        description: builder.description,
        amount: builder.amount,
        interval: builder.interval,
        start_date: builder.start_date,
        end_date: builder.end_date,
    })
}

/// Retrieve a recurring expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid recurring expense,
/// - [Error::MalformedDefinition] if the stored row holds invalid values,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_recurring_expense(
    id: RecurringExpenseId,
    connection: &Connection,
) -> Result<RecurringExpense, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, frequency, start_date, end_date
             FROM recurring_expense WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], |row| Ok(map_recurring_expense_row(row)))?
}

/// Retrieve all recurring expenses, ordered by ID.
///
/// Unlike [get_active_recurring_expenses], a single malformed row fails the
/// whole query.
///
/// # Errors
/// This function will return a [Error::MalformedDefinition] if a stored row
/// holds invalid values, or a [Error::SqlError] if there is some other SQL error.
pub fn get_recurring_expenses(connection: &Connection) -> Result<Vec<RecurringExpense>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, frequency, start_date, end_date
             FROM recurring_expense ORDER BY id",
        )?
        .query_map([], |row| Ok(map_recurring_expense_row(row)))?
        .map(|maybe_expense| maybe_expense.map_err(Error::from).and_then(|expense| expense))
        .collect()
}

/// Retrieve the recurring expenses with `interval` whose active lifespan
/// overlaps the days `first_day` to `last_day` (inclusive).
///
/// Each row is mapped independently, so a malformed row shows up as an
/// [Error::MalformedDefinition] item instead of failing the query.
///
/// # Errors
/// This function will return a [Error::SqlError] if the query itself fails.
pub fn get_active_recurring_expenses(
    interval: Interval,
    first_day: Date,
    last_day: Date,
    connection: &Connection,
) -> Result<Vec<Result<RecurringExpense, Error>>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, frequency, start_date, end_date
             FROM recurring_expense
             WHERE frequency = ?1
               AND start_date <= ?2
               AND (end_date IS NULL OR end_date >= ?3)
             ORDER BY id",
        )?
        .query_map((interval.as_str(), last_day, first_day), |row| {
            Ok(map_recurring_expense_row(row))
        })?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Delete a recurring expense.
///
/// Transactions that were materialized from the expense are kept.
///
/// # Errors
/// This function will return a [Error::NotFound] if `id` does not refer to a
/// recurring expense, or a [Error::SqlError] if there is some other SQL error.
pub fn delete_recurring_expense(
    id: RecurringExpenseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM recurring_expense WHERE id = :id", &[(":id", &id)])?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Create the recurring expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_recurring_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL DEFAULT '',
                amount REAL NOT NULL,
                frequency TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_recurring_expense_frequency_dates
         ON recurring_expense(frequency, start_date, end_date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a recurring expense.
///
/// Any column after the ID that cannot be read is reported as an
/// [Error::MalformedDefinition] for that ID.
fn map_recurring_expense_row(row: &Row) -> Result<RecurringExpense, Error> {
    let id: RecurringExpenseId = row.get(0)?;
    let malformed = |error: rusqlite::Error| Error::MalformedDefinition(id, error.to_string());

    let description = row.get(1).map_err(malformed)?;
    let amount = row.get(2).map_err(malformed)?;
    let interval: String = row.get(3).map_err(malformed)?;
    let interval = interval
        .parse()
        .map_err(|error: Error| Error::MalformedDefinition(id, error.to_string()))?;
    let start_date = row.get(4).map_err(malformed)?;
    let end_date = row.get(5).map_err(malformed)?;

    let expense = RecurringExpense {
        id,
        description,
        amount,
        interval,
        start_date,
        end_date,
    };
    expense.validate()?;

    Ok(expense)
}

// ============================================================================
// TESTS
// ============================================================================
