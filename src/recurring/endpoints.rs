//! The JSON endpoints for managing recurring expenses and triggering the job.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    database_id::RecurringExpenseId,
    db::lock_connection,
    recurring::{
        Interval, RecurringExpense, RunReport, SQLiteMaterializationJob,
        create_recurring_expense, delete_recurring_expense, get_recurring_expense,
        get_recurring_expenses, materialize_all,
    },
};

/// The state needed to manage recurring expense definitions.
#[derive(Debug, Clone)]
pub struct RecurringExpenseState {
    /// The database connection for managing recurring expenses.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurringExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed to trigger the materialization job.
#[derive(Debug, Clone)]
pub struct MaterializeState {
    /// The job shared with the background scheduler.
    job: Arc<SQLiteMaterializationJob>,
}

impl FromRef<AppState> for MaterializeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            job: state.job.clone(),
        }
    }
}

/// The request body for creating a recurring expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringExpenseForm {
    /// The label for materialized transactions, may be left out.
    #[serde(default)]
    pub description: String,
    /// The signed amount copied into each transaction.
    pub amount: f64,
    /// The first day the expense is active, "YYYY-MM-DD".
    pub start_date: Date,
    /// How often the expense recurs.
    pub interval: Interval,
    /// The last day the expense is active, if any.
    #[serde(default)]
    pub end_date: Option<Date>,
}

/// The response body of a manual materialization run.
#[derive(Debug, Serialize)]
pub struct MaterializeResponse {
    /// The result of the monthly pass.
    pub monthly: RunReport,
    /// The result of the annual pass.
    pub annual: RunReport,
}

/// A route handler that lists every recurring expense.
pub async fn get_recurring_expenses_endpoint(
    State(state): State<RecurringExpenseState>,
) -> Result<Json<Vec<RecurringExpense>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_recurring_expenses(&connection).map(Json)
}

/// A route handler that responds with a single recurring expense.
pub async fn get_recurring_expense_endpoint(
    State(state): State<RecurringExpenseState>,
    Path(recurring_id): Path<RecurringExpenseId>,
) -> Result<Json<RecurringExpense>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_recurring_expense(recurring_id, &connection).map(Json)
}

/// A route handler for creating a recurring expense, responds with the new expense.
pub async fn create_recurring_expense_endpoint(
    State(state): State<RecurringExpenseState>,
    form: Result<Json<RecurringExpenseForm>, JsonRejection>,
) -> Result<(StatusCode, Json<RecurringExpense>), Error> {
    let Json(form) = form.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

    let builder = RecurringExpense::build(form.amount, form.start_date, form.interval)
        .description(&form.description)
        .end_date(form.end_date);

    let connection = lock_connection(&state.db_connection)?;
    let recurring_expense = create_recurring_expense(builder, &connection)?;
    tracing::info!("Created recurring expense {}", recurring_expense.id);

    Ok((StatusCode::CREATED, Json(recurring_expense)))
}

/// A route handler for deleting a recurring expense.
///
/// Transactions already materialized from the expense are kept.
pub async fn delete_recurring_expense_endpoint(
    State(state): State<RecurringExpenseState>,
    Path(recurring_id): Path<RecurringExpenseId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_recurring_expense(recurring_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler that runs the monthly and annual passes of the job right now.
pub async fn materialize_endpoint(
    State(state): State<MaterializeState>,
) -> Result<Json<MaterializeResponse>, Error> {
    let (monthly, annual) = materialize_all(state.job.clone(), OffsetDateTime::now_utc()).await?;

    Ok(Json(MaterializeResponse {
        monthly: monthly.into(),
        annual: annual.into(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        recurring::{Interval, RecurringExpense, create_recurring_expense},
        test_utils::get_test_server,
        transaction::get_transactions,
    };

    #[tokio::test]
    async fn create_then_list() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::RECURRING_EXPENSES)
            .json(&json!({
                "description": "Gym",
                "amount": -50.0,
                "start_date": "2024-01-10",
                "interval": "monthly",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created = response.json::<RecurringExpense>();
        assert_eq!(created.description, "Gym");
        assert_eq!(created.start_date, date!(2024 - 01 - 10));
        assert_eq!(created.end_date, None);
        let listed = server
            .get(endpoints::RECURRING_EXPENSES)
            .await
            .json::<Vec<RecurringExpense>>();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn create_rejects_end_before_start() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::RECURRING_EXPENSES)
            .json(&json!({
                "amount": -50.0,
                "start_date": "2024-03-10",
                "end_date": "2024-03-01",
                "interval": "monthly",
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_rejects_unknown_interval() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::RECURRING_EXPENSES)
            .json(&json!({
                "amount": -50.0,
                "start_date": "2024-03-10",
                "interval": "weekly",
            }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn get_by_id() {
        let (server, state) = get_test_server();
        let created = create_recurring_expense(
            RecurringExpense::build(-12.5, date!(2024 - 02 - 01), Interval::Monthly)
                .description("Streaming"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = server
            .get(&format_endpoint(endpoints::RECURRING_EXPENSE, created.id))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<RecurringExpense>(), created);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let (server, _) = get_test_server();

        server
            .get(&format_endpoint(endpoints::RECURRING_EXPENSE, 42))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let (server, _) = get_test_server();

        server
            .delete(&format_endpoint(endpoints::RECURRING_EXPENSE, 42))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_keeps_materialized_transactions() {
        let (server, state) = get_test_server();
        let created = create_recurring_expense(
            RecurringExpense::build(-50.0, date!(2020 - 01 - 01), Interval::Monthly),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        server
            .post(endpoints::MATERIALIZE)
            .await
            .assert_status_ok();

        server
            .delete(&format_endpoint(endpoints::RECURRING_EXPENSE, created.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let transactions = get_transactions(None, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transactions.len(), 1);
    }

    #[tokio::test]
    async fn materialize_twice_creates_once() {
        let (server, state) = get_test_server();
        create_recurring_expense(
            RecurringExpense::build(-900.0, date!(2020 - 01 - 01), Interval::Monthly)
                .description("Rent"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        create_recurring_expense(
            RecurringExpense::build(-480.0, date!(2020 - 01 - 01), Interval::Annual)
                .description("Insurance"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let first = server.post(endpoints::MATERIALIZE).await.json::<Value>();
        let second = server.post(endpoints::MATERIALIZE).await.json::<Value>();

        assert_eq!(first["monthly"]["created"].as_array().unwrap().len(), 1);
        assert_eq!(first["annual"]["created"].as_array().unwrap().len(), 1);
        assert_eq!(second["monthly"]["created"].as_array().unwrap().len(), 0);
        assert_eq!(second["monthly"]["skipped"], 1);
        assert_eq!(second["annual"]["skipped"], 1);
    }
}
