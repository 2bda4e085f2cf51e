//! Implements a SQLite backed recurring expense store.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    db::lock_connection,
    recurring::{Interval, RecurringExpense, get_active_recurring_expenses},
    stores::RecurrenceStore,
};

/// Reads recurring expense definitions from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteRecurrenceStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteRecurrenceStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RecurrenceStore for SQLiteRecurrenceStore {
    fn list_active(
        &self,
        interval: Interval,
        first_day: Date,
        last_day: Date,
    ) -> Result<Vec<Result<RecurringExpense, Error>>, Error> {
        let connection = lock_connection(&self.connection)?;

        get_active_recurring_expenses(interval, first_day, last_day, &connection)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use time::macros::date;

    use crate::{
        recurring::{Interval, RecurringExpense, create_recurring_expense},
        stores::RecurrenceStore,
        test_utils::get_test_connection,
    };

    use super::SQLiteRecurrenceStore;

    #[test]
    fn lists_active_monthly_definitions() {
        let conn = get_test_connection();
        let gym = create_recurring_expense(
            RecurringExpense::build(-50.0, date!(2024 - 01 - 10), Interval::Monthly)
                .description("Gym"),
            &conn,
        )
        .unwrap();
        create_recurring_expense(
            RecurringExpense::build(-120.0, date!(2024 - 01 - 10), Interval::Annual)
                .description("Insurance"),
            &conn,
        )
        .unwrap();
        let store = SQLiteRecurrenceStore::new(Arc::new(Mutex::new(conn)));

        let got = store
            .list_active_monthly(date!(2024 - 03 - 01), date!(2024 - 03 - 31))
            .unwrap();

        assert_eq!(got, vec![Ok(gym)]);
    }
}
