//! Defines the endpoint for deleting a transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{TransactionsState, delete_transaction},
};

/// A route handler for deleting a transaction, responds with no content.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionsState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::datetime;

    use crate::{
        Error,
        endpoints::{self, format_endpoint},
        test_utils::get_test_server,
        transaction::{Transaction, create_transaction, get_transaction},
    };

    #[tokio::test]
    async fn deletes_transaction() {
        let (server, state) = get_test_server();
        let created = create_transaction(
            Transaction::build("Cafe", -3.0, datetime!(2024-03-01 08:00 UTC), "Sorties"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, created.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(
            get_transaction(created.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (server, _) = get_test_server();

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, 7))
            .await
            .assert_status_not_found();
    }
}
