//! Recurring expenses and the job that materializes them into transactions.

mod core;
mod endpoints;
mod job;
mod schedule;

pub use core::{
    DEFAULT_RECURRING_LABEL, Interval, RecurringExpense, RecurringExpenseBuilder,
    create_recurring_expense, create_recurring_expense_table, delete_recurring_expense,
    get_active_recurring_expenses, get_recurring_expense, get_recurring_expenses,
};
pub use endpoints::{
    create_recurring_expense_endpoint, delete_recurring_expense_endpoint,
    get_recurring_expense_endpoint, get_recurring_expenses_endpoint, materialize_endpoint,
};
pub use job::{
    FailureReport, MaterializationFailure, RecurringMaterializationJob, RunReport, RunSummary,
    SQLiteMaterializationJob,
};
pub use schedule::{RETRY_DELAY, duration_until_next_month, materialize_all, run_schedule};
