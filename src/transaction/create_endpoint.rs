//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error,
    db::lock_connection,
    timezone::LocalTimezone,
    transaction::{Transaction, TransactionsState, create_transaction, form::TransactionForm},
};

/// A route handler for creating a new transaction, responds with the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionsState>,
    form: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let Json(form) = form.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;
    let timezone = LocalTimezone::from_name(&state.local_timezone)?;
    let new_transaction = form.into_new_transaction(timezone)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(new_transaction, &connection)?;
    tracing::debug!("Created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}
