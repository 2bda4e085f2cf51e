//! Defines the endpoint for replacing a transaction.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    Error,
    database_id::TransactionId,
    db::lock_connection,
    timezone::LocalTimezone,
    transaction::{Transaction, TransactionsState, form::TransactionForm, update_transaction},
};

/// A route handler for replacing the label, amount, date and category of a transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionsState>,
    Path(transaction_id): Path<TransactionId>,
    form: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Json(form) = form.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;
    let timezone = LocalTimezone::from_name(&state.local_timezone)?;
    let update = form.into_update(timezone)?;

    let connection = lock_connection(&state.db_connection)?;

    update_transaction(transaction_id, update, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::get_test_server,
        transaction::{Transaction, create_transaction, get_transaction},
    };

    #[tokio::test]
    async fn replaces_fields() {
        let (server, state) = get_test_server();
        let created = create_transaction(
            Transaction::build("Cafe", -3.0, datetime!(2024-03-01 08:00 UTC), "Sorties"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        server
            .put(&format_endpoint(endpoints::TRANSACTION, created.id))
            .json(&json!({
                "label": "Restaurant",
                "amount": -30.0,
                "date": "2024-03-02T19:30:00Z",
                "category": "Sorties",
            }))
            .await
            .assert_status_ok();

        let updated = get_transaction(created.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.label, "Restaurant");
        assert_eq!(updated.amount, -30.0);
        assert_eq!(updated.date, datetime!(2024-03-02 19:30 UTC));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (server, _) = get_test_server();

        server
            .put(&format_endpoint(endpoints::TRANSACTION, 99))
            .json(&json!({
                "label": "Restaurant",
                "amount": -30.0,
                "date": "2024-03-02",
                "category": "Sorties",
            }))
            .await
            .assert_status_not_found();
    }
}
