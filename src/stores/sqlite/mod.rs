//! SQLite backed implementations of the store traits.
//!
//! Every store shares the one connection used by the rest of the app.

mod recurrence;
mod transaction;

pub use recurrence::SQLiteRecurrenceStore;
pub use transaction::SQLiteTransactionStore;
