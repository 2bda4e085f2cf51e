//! Transaction statistics: totals per month and per category.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    period::PeriodWindow,
    timezone::LocalTimezone,
    transaction::core::{Transaction, get_transactions},
};

/// The net amount of all transactions in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// The month as "YYYY-MM".
    pub month: String,
    /// The sum of the transaction amounts in the month.
    pub total: f64,
}

/// The net amount of all transactions in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The sum of the transaction amounts in the category.
    pub total: f64,
}

/// Sum transaction amounts by calendar month, as seen from `timezone`.
///
/// # Returns
/// One entry per month that has at least one transaction, in chronological order.
pub fn get_monthly_totals(
    timezone: impl Into<LocalTimezone>,
    connection: &Connection,
) -> Result<Vec<MonthlyTotal>, Error> {
    let transactions = get_transactions(None, connection)?;

    Ok(aggregate_by_month(&transactions, timezone.into()))
}

/// Sum transaction amounts by category, optionally limited to `window`.
///
/// # Returns
/// One entry per category, ordered by category name.
pub fn get_category_totals(
    window: Option<&PeriodWindow>,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    let (start, end) = match window {
        Some(window) => (window.start.unix_timestamp(), window.end.unix_timestamp()),
        None => (i64::MIN, i64::MAX),
    };

    connection
        .prepare(
            "SELECT category, SUM(amount) FROM \"transaction\"
             WHERE date BETWEEN ?1 AND ?2
             GROUP BY category
             ORDER BY category",
        )?
        .query_map((start, end), |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

fn aggregate_by_month(transactions: &[Transaction], timezone: LocalTimezone) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<(i32, u8), f64> = BTreeMap::new();

    for transaction in transactions {
        let local_date = transaction
            .date
            .to_offset(timezone.offset_at(transaction.date));
        let key = (local_date.year(), u8::from(local_date.month()));
        *totals.entry(key).or_insert(0.0) += transaction.amount;
    }

    totals
        .into_iter()
        .map(|((year, month), total)| MonthlyTotal {
            month: format!("{year:04}-{month:02}"),
            total,
        })
        .collect()
}
