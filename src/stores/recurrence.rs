//! Defines the recurring expense store trait.

use time::Date;

use crate::{
    Error,
    recurring::{Interval, RecurringExpense},
};

/// Read access to recurring expense definitions.
pub trait RecurrenceStore {
    /// Retrieve the definitions with `interval` whose lifespan overlaps the
    /// days `first_day` to `last_day` (inclusive).
    ///
    /// Each definition is returned as its own [Result] so that one malformed
    /// definition does not hide the others.
    ///
    /// # Errors
    /// Implementers should return [Error::StoreUnavailable] if the underlying
    /// storage cannot be reached.
    fn list_active(
        &self,
        interval: Interval,
        first_day: Date,
        last_day: Date,
    ) -> Result<Vec<Result<RecurringExpense, Error>>, Error>;

    /// Retrieve the monthly definitions active between `first_day` and `last_day`.
    fn list_active_monthly(
        &self,
        first_day: Date,
        last_day: Date,
    ) -> Result<Vec<Result<RecurringExpense, Error>>, Error> {
        self.list_active(Interval::Monthly, first_day, last_day)
    }
}
