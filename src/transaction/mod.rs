//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` builder
//! - Database functions for storing, querying and aggregating transactions
//! - The JSON endpoints for transactions and their statistics

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod list_endpoint;
mod stats;
mod stats_endpoint;

pub use core::{
    NewTransaction, RECURRING_CATEGORY, Transaction, TransactionUpdate, create_transaction,
    create_transaction_table, delete_transaction, exists_for_recurrence_in_window,
    get_transaction, get_transactions, get_transactions_total, map_transaction_row,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use form::{TransactionForm, parse_transaction_date};
pub use list_endpoint::{MonthQuery, TransactionsState, get_transactions_endpoint};
pub use stats::{CategoryTotal, MonthlyTotal, get_category_totals, get_monthly_totals};
pub use stats_endpoint::{get_category_stats_endpoint, get_monthly_stats_endpoint};
