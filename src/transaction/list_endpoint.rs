//! Defines the endpoint for listing transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    db::lock_connection,
    period::{PeriodWindow, month_window, parse_month},
    timezone::LocalTimezone,
    transaction::{Transaction, get_transactions},
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Paris".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for endpoints that can be limited to one month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month as "YYYY-MM".
    pub month: Option<String>,
}

impl MonthQuery {
    /// The window for the requested month in `timezone`, `None` if no month was given.
    pub fn window(&self, timezone: LocalTimezone) -> Result<Option<PeriodWindow>, Error> {
        self.month
            .as_deref()
            .map(|month| {
                let (year, month) = parse_month(month)?;
                month_window(year, month, timezone)
            })
            .transpose()
    }
}

/// A route handler that lists transactions newest first, optionally limited to one month.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let timezone = LocalTimezone::from_name(&state.local_timezone)?;
    let window = query.window(timezone)?;

    let connection = lock_connection(&state.db_connection)?;

    get_transactions(window.as_ref(), &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        AppState, endpoints,
        test_utils::get_test_server,
        transaction::{Transaction, create_transaction},
    };

    fn insert(label: &str, date: OffsetDateTime, state: &AppState) {
        create_transaction(
            Transaction::build(label, -10.0, date, "Autre"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let (server, state) = get_test_server();
        insert("Older", datetime!(2024-03-01 10:00 UTC), &state);
        insert("Newer", datetime!(2024-03-20 10:00 UTC), &state);

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();

        let labels: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn filters_by_month() {
        let (server, state) = get_test_server();
        insert("February", datetime!(2024-02-29 23:59:59 UTC), &state);
        insert("March", datetime!(2024-03-01 00:00 UTC), &state);
        insert("April", datetime!(2024-04-01 00:00 UTC), &state);

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "2024-03")
            .await
            .json::<Vec<Transaction>>();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].label, "March");
    }

    #[tokio::test]
    async fn rejects_malformed_month() {
        let (server, _) = get_test_server();

        server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "march")
            .await
            .assert_status_bad_request();
    }
}
