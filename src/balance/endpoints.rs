//! The JSON endpoints for the initial balance and the running total.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    balance::{
        BalanceSetting, BalanceSummary, get_balance_setting, get_balance_summary,
        set_balance_setting,
    },
    db::lock_connection,
};

/// The state needed to read and set the balance.
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// The database connection for the balance setting and transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BalanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with the initial balance.
pub async fn get_balance_endpoint(
    State(state): State<BalanceState>,
) -> Result<Json<BalanceSetting>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_balance_setting(&connection).map(Json)
}

/// A route handler that sets the initial balance.
pub async fn set_balance_endpoint(
    State(state): State<BalanceState>,
    body: Result<Json<BalanceSetting>, JsonRejection>,
) -> Result<Json<BalanceSetting>, Error> {
    let Json(BalanceSetting { initial }) =
        body.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

    let connection = lock_connection(&state.db_connection)?;
    let setting = set_balance_setting(initial, &connection)?;
    tracing::info!("Set the initial balance to {}", setting.initial);

    Ok(Json(setting))
}

/// A route handler that responds with the initial balance plus all transactions.
pub async fn get_balance_total_endpoint(
    State(state): State<BalanceState>,
) -> Result<Json<BalanceSummary>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_balance_summary(&connection).map(Json)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        balance::{BalanceSetting, BalanceSummary},
        endpoints,
        test_utils::get_test_server,
        transaction::{Transaction, create_transaction},
    };

    #[tokio::test]
    async fn unset_balance_is_zero() {
        let (server, _) = get_test_server();

        let setting = server.get(endpoints::BALANCE).await.json::<BalanceSetting>();

        assert_eq!(setting, BalanceSetting { initial: 0.0 });
    }

    #[tokio::test]
    async fn set_then_get() {
        let (server, _) = get_test_server();

        server
            .put(endpoints::BALANCE)
            .json(&json!({ "initial": 1500.0 }))
            .await
            .assert_status_ok();

        let setting = server.get(endpoints::BALANCE).await.json::<BalanceSetting>();
        assert_eq!(setting, BalanceSetting { initial: 1500.0 });
    }

    #[tokio::test]
    async fn set_rejects_non_numeric() {
        let (server, _) = get_test_server();

        server
            .put(endpoints::BALANCE)
            .json(&json!({ "initial": "lots" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn total_includes_transactions() {
        let (server, state) = get_test_server();
        create_transaction(
            Transaction::build("Loyer", -900.0, datetime!(2024-03-01 08:00 UTC), "Fixe"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        server
            .put(endpoints::BALANCE)
            .json(&json!({ "initial": 1000.0 }))
            .await
            .assert_status_ok();

        let summary = server
            .get(endpoints::BALANCE_TOTAL)
            .await
            .json::<BalanceSummary>();

        assert_eq!(
            summary,
            BalanceSummary {
                initial: 1000.0,
                transactions_total: -900.0,
                balance: 100.0,
            }
        );
    }
}
