//! Contains the store traits the recurring expense job depends on, and their
//! SQLite implementations.

mod recurrence;
mod transaction;

pub mod sqlite;

pub use recurrence::RecurrenceStore;
pub use sqlite::{SQLiteRecurrenceStore, SQLiteTransactionStore};
pub use transaction::TransactionStore;
