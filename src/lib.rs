//! Pocket Ledger is a small personal finance tracker.
//!
//! This library provides a JSON REST API for transactions, an initial balance
//! and recurring expenses, plus the job that materializes recurring expenses
//! into one transaction per month (or year), no matter how often it runs.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod balance;
mod database_id;
mod db;
mod endpoints;
mod error;
mod logging;
mod period;
mod recurring;
mod routing;
pub mod stores;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::{DatabaseId, RecurringExpenseId, TransactionId};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::{PeriodWindow, month_window, parse_month, year_window};
pub use recurring::{
    Interval, MaterializationFailure, RETRY_DELAY, RecurringExpense, RecurringMaterializationJob,
    RunSummary, SQLiteMaterializationJob, duration_until_next_month, run_schedule,
};
pub use routing::build_router;
pub use timezone::LocalTimezone;
pub use transaction::{NewTransaction, RECURRING_CATEGORY, Transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
