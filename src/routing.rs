//! Application router configuration for the JSON API.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    balance::{get_balance_endpoint, get_balance_total_endpoint, set_balance_endpoint},
    endpoints,
    recurring::{
        create_recurring_expense_endpoint, delete_recurring_expense_endpoint,
        get_recurring_expense_endpoint, get_recurring_expenses_endpoint, materialize_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_category_stats_endpoint, get_monthly_stats_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_STATS, get(get_monthly_stats_endpoint))
        .route(endpoints::CATEGORY_STATS, get(get_category_stats_endpoint));

    let balance_routes = Router::new()
        .route(
            endpoints::BALANCE,
            get(get_balance_endpoint).put(set_balance_endpoint),
        )
        .route(endpoints::BALANCE_TOTAL, get(get_balance_total_endpoint));

    let recurring_routes = Router::new()
        .route(
            endpoints::RECURRING_EXPENSES,
            get(get_recurring_expenses_endpoint).post(create_recurring_expense_endpoint),
        )
        .route(
            endpoints::RECURRING_EXPENSE,
            get(get_recurring_expense_endpoint).delete(delete_recurring_expense_endpoint),
        )
        .route(endpoints::MATERIALIZE, post(materialize_endpoint));

    transaction_routes
        .merge(balance_routes)
        .merge(recurring_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested route does not exist" })),
    )
        .into_response()
}
