//! Defines the endpoints for transaction statistics.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    Error,
    db::lock_connection,
    timezone::LocalTimezone,
    transaction::{
        CategoryTotal, MonthQuery, MonthlyTotal, TransactionsState, get_category_totals,
        get_monthly_totals,
    },
};

/// A route handler that responds with the net total of each month.
pub async fn get_monthly_stats_endpoint(
    State(state): State<TransactionsState>,
) -> Result<Json<Vec<MonthlyTotal>>, Error> {
    let timezone = LocalTimezone::from_name(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    get_monthly_totals(timezone, &connection).map(Json)
}

/// A route handler that responds with the net total of each category,
/// optionally limited to one month.
pub async fn get_category_stats_endpoint(
    State(state): State<TransactionsState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let timezone = LocalTimezone::from_name(&state.local_timezone)?;
    let window = query.window(timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    get_category_totals(window.as_ref(), &connection).map(Json)
}
