//! The request body shared by the create and edit transaction endpoints.

use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::{
    Error,
    timezone::LocalTimezone,
    transaction::{NewTransaction, Transaction, TransactionUpdate},
};

/// The JSON body for creating or replacing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Text describing the transaction.
    pub label: String,
    /// The signed amount, negative for expenses.
    pub amount: f64,
    /// Either an RFC 3339 date-time or a calendar date "YYYY-MM-DD".
    pub date: String,
    /// The category name.
    pub category: String,
}

impl TransactionForm {
    /// Convert the form into a transaction to insert, reading calendar dates
    /// as midnight in `timezone`.
    pub fn into_new_transaction(self, timezone: LocalTimezone) -> Result<NewTransaction, Error> {
        let date = parse_transaction_date(&self.date, timezone)?;

        Ok(Transaction::build(&self.label, self.amount, date, &self.category))
    }

    /// Convert the form into a full replacement of an existing transaction.
    pub fn into_update(self, timezone: LocalTimezone) -> Result<TransactionUpdate, Error> {
        let date = parse_transaction_date(&self.date, timezone)?;

        Ok(TransactionUpdate {
            label: self.label,
            amount: self.amount,
            date,
            category: self.category,
        })
    }
}

/// Parse `text` as an RFC 3339 date-time or, failing that, as a calendar date
/// at midnight in `timezone`.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is in neither format.
pub fn parse_transaction_date(
    text: &str,
    timezone: impl Into<LocalTimezone>,
) -> Result<OffsetDateTime, Error> {
    let timezone = timezone.into();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(date_time);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(|date| timezone.earliest_instant(PrimitiveDateTime::new(date, Time::MIDNIGHT)))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}
