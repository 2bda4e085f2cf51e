//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ErrorCode;
use serde_json::json;
use time::Date;

use crate::database_id::RecurringExpenseId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction already exists for the recurring expense and period.
    ///
    /// Raised by the store when the `(recurring_id, recurring_period)`
    /// uniqueness constraint rejects an insert. The materialization job treats
    /// this as "already materialized".
    #[error("a transaction has already been materialized for this recurring expense and period")]
    Conflict,

    /// The database could not be reached, e.g. it is locked, busy or the file
    /// cannot be opened.
    ///
    /// A materialization run that hits this error stops and should be retried
    /// on the next scheduler tick.
    #[error("the data store is unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored recurring expense could not be read or holds invalid values.
    #[error("recurring expense {0} is malformed: {1}")]
    MalformedDefinition(RecurringExpenseId, String),

    /// A recurring expense was given an end date before its start date.
    #[error("the end date {end} is before the start date {start}")]
    InvalidDateRange {
        /// The first day the recurring expense is active.
        start: Date,
        /// The last day the recurring expense is active.
        end: Date,
    },

    /// An amount was NaN or infinite.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// A month query parameter was not in the form `YYYY-MM`.
    #[error("\"{0}\" is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),

    /// A date or date-time string could not be parsed.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD or an RFC 3339 date-time")]
    InvalidDate(String),

    /// A calendar component was out of range when building a date or time.
    #[error("invalid calendar value: {0}")]
    InvalidCalendarValue(String),

    /// A required text field was empty.
    #[error("the field \"{0}\" cannot be empty")]
    EmptyField(&'static str),

    /// The recurrence interval text did not match a known interval.
    #[error("\"{0}\" is not a valid interval, expected \"monthly\" or \"annual\"")]
    InvalidInterval(String),

    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The lock that serializes materialization runs was poisoned by a panic.
    #[error("could not acquire the materialization job lock")]
    JobLockError,

    /// The background task running a materialization pass panicked or was cancelled.
    #[error("the materialization task did not finish: {0}")]
    JobAborted(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(ref sql_error, _)
                if matches!(
                    sql_error.code,
                    ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::CannotOpen
                        | ErrorCode::SystemIoFailure
                ) =>
            {
                Error::StoreUnavailable(value.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<time::error::ComponentRange> for Error {
    fn from(value: time::error::ComponentRange) -> Self {
        Error::InvalidCalendarValue(value.to_string())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Conflict => StatusCode::CONFLICT,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidDateRange { .. }
            | Error::InvalidAmount(_)
            | Error::InvalidMonth(_)
            | Error::InvalidDate(_)
            | Error::InvalidCalendarValue(_)
            | Error::EmptyField(_)
            | Error::InvalidInterval(_)
            | Error::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Error::MalformedDefinition(..)
            | Error::InvalidTimezone(_)
            | Error::JobLockError
            | Error::JobAborted(_)
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are only meant for the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::ffi;

    use super::Error;

    #[test]
    fn busy_database_is_unavailable() {
        let error = rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_BUSY),
            Some("database is locked".to_owned()),
        );

        assert!(matches!(Error::from(error), Error::StoreUnavailable(_)));
    }

    #[test]
    fn no_rows_is_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let response = Error::EmptyField("label").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sql_errors_are_internal_server_errors() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
