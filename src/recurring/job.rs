//! The job that turns recurring expenses into concrete transactions.
//!
//! Each run covers the period (month or year) that `now` falls in and creates
//! at most one transaction per active recurring expense for that period. The
//! job keeps no state of its own: whether an expense is already covered is
//! decided by asking the [TransactionStore], so rerunning the job, or running
//! it after a crash, never duplicates a transaction.

use std::sync::Mutex;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::RecurringExpenseId,
    period::PeriodWindow,
    recurring::{Interval, RecurringExpense},
    stores::{RecurrenceStore, SQLiteRecurrenceStore, SQLiteTransactionStore, TransactionStore},
    timezone::LocalTimezone,
    transaction::{RECURRING_CATEGORY, Transaction},
};

/// The materialization job backed by the application's SQLite database.
pub type SQLiteMaterializationJob =
    RecurringMaterializationJob<SQLiteRecurrenceStore, SQLiteTransactionStore>;

/// A recurring expense that could not be materialized during a run.
#[derive(Debug, PartialEq)]
pub struct MaterializationFailure {
    /// The recurring expense that failed, if its ID could be read.
    pub recurring_id: Option<RecurringExpenseId>,
    /// Why it failed.
    pub error: Error,
}

/// What a single run of the job did.
#[derive(Debug, PartialEq)]
pub struct RunSummary {
    /// The period the run covered, e.g. "2024-03" or "2024".
    pub period: String,
    /// The transactions created by this run.
    pub created: Vec<Transaction>,
    /// The number of active recurring expenses that were already materialized.
    pub skipped: usize,
    /// The recurring expenses that failed and were left for the next run.
    pub failures: Vec<MaterializationFailure>,
}

/// The JSON view of a [RunSummary].
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// The period the run covered.
    pub period: String,
    /// The transactions created by the run.
    pub created: Vec<Transaction>,
    /// The number of recurring expenses that were already materialized.
    pub skipped: usize,
    /// The recurring expenses that failed.
    pub failed: Vec<FailureReport>,
}

/// The JSON view of a [MaterializationFailure].
#[derive(Debug, Serialize)]
pub struct FailureReport {
    /// The recurring expense that failed, if known.
    pub recurring_id: Option<RecurringExpenseId>,
    /// A description of the error.
    pub error: String,
}

impl From<RunSummary> for RunReport {
    fn from(summary: RunSummary) -> Self {
        Self {
            period: summary.period,
            created: summary.created,
            skipped: summary.skipped,
            failed: summary
                .failures
                .into_iter()
                .map(|failure| FailureReport {
                    recurring_id: failure.recurring_id,
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

enum Outcome {
    Created(Transaction),
    AlreadyMaterialized,
}

/// Materializes recurring expenses into transactions, at most once per period.
///
/// Runs are serialized: a run that starts while another is in progress waits
/// for it to finish and then finds its transactions already in place.
#[derive(Debug)]
pub struct RecurringMaterializationJob<R, T> {
    recurrences: R,
    transactions: T,
    timezone: LocalTimezone,
    run_lock: Mutex<()>,
}

impl<R, T> RecurringMaterializationJob<R, T>
where
    R: RecurrenceStore,
    T: TransactionStore,
{
    /// Create a job that reads definitions from `recurrences` and writes to
    /// `transactions`.
    ///
    /// `timezone` is the timezone that month and year boundaries are computed
    /// in, either a named zone or a fixed [time::UtcOffset].
    pub fn new(recurrences: R, transactions: T, timezone: impl Into<LocalTimezone>) -> Self {
        Self {
            recurrences,
            transactions,
            timezone: timezone.into(),
            run_lock: Mutex::new(()),
        }
    }

    /// The timezone that [Self::run] and [Self::run_annual] compute periods in.
    pub fn timezone(&self) -> LocalTimezone {
        self.timezone
    }

    /// Materialize the monthly recurring expenses for the month containing `now`.
    ///
    /// Created transactions are dated `now`.
    ///
    /// # Errors
    /// Returns [Error::StoreUnavailable] if a store cannot be reached, in which
    /// case the run should be retried later. Failures that only affect one
    /// recurring expense are reported in [RunSummary::failures] instead.
    pub fn run(&self, now: OffsetDateTime) -> Result<RunSummary, Error> {
        self.run_in(Interval::Monthly, now, self.timezone)
    }

    /// Materialize the annual recurring expenses for the year containing `now`.
    ///
    /// # Errors
    /// See [Self::run].
    pub fn run_annual(&self, now: OffsetDateTime) -> Result<RunSummary, Error> {
        self.run_in(Interval::Annual, now, self.timezone)
    }

    /// Materialize the recurring expenses with `interval` for the period
    /// containing `now`, computing period boundaries in `timezone`.
    ///
    /// # Errors
    /// See [Self::run].
    pub fn run_in(
        &self,
        interval: Interval,
        now: OffsetDateTime,
        timezone: impl Into<LocalTimezone>,
    ) -> Result<RunSummary, Error> {
        let _guard = self.run_lock.lock().map_err(|_| Error::JobLockError)?;

        let window = PeriodWindow::containing(now, interval, timezone)?;
        let period = window.key();
        let definitions =
            self.recurrences
                .list_active(interval, window.first_day, window.last_day)?;

        let mut summary = RunSummary {
            period,
            created: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        };

        for definition in definitions {
            let (recurring_id, outcome) = match definition {
                Ok(definition) => {
                    if definition.interval != interval
                        || !window.overlaps(definition.start_date, definition.end_date)
                    {
                        continue;
                    }

                    (
                        Some(definition.id),
                        self.materialize(&definition, &window, now),
                    )
                }
                Err(error) => (malformed_definition_id(&error), Err(error)),
            };

            match outcome {
                Ok(Outcome::Created(transaction)) => summary.created.push(transaction),
                Ok(Outcome::AlreadyMaterialized) => summary.skipped += 1,
                Err(error @ Error::StoreUnavailable(_)) => {
                    tracing::error!(
                        "Stopping the {interval} recurring expense run for {}: {error}",
                        summary.period
                    );
                    return Err(error);
                }
                Err(error) => {
                    tracing::error!(
                        "Could not materialize recurring expense {recurring_id:?} for {}: {error}",
                        summary.period
                    );
                    summary.failures.push(MaterializationFailure {
                        recurring_id,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            "Materialized {interval} recurring expenses for {}: {} created, {} already present, {} failed",
            summary.period,
            summary.created.len(),
            summary.skipped,
            summary.failures.len()
        );

        Ok(summary)
    }

    fn materialize(
        &self,
        definition: &RecurringExpense,
        window: &PeriodWindow,
        now: OffsetDateTime,
    ) -> Result<Outcome, Error> {
        definition.validate()?;

        if self
            .transactions
            .exists_for_recurrence_in_window(definition.id, window.start, window.end)?
        {
            tracing::debug!(
                "Recurring expense {} already materialized for {}",
                definition.id,
                window.key()
            );
            return Ok(Outcome::AlreadyMaterialized);
        }

        let new_transaction =
            Transaction::build(definition.label(), definition.amount, now, RECURRING_CATEGORY)
                .recurrence(definition.id, window.key());

        match self.transactions.insert(new_transaction) {
            Ok(transaction) => {
                tracing::info!(
                    "Created transaction {} from recurring expense {} for {}",
                    transaction.id,
                    definition.id,
                    window.key()
                );
                Ok(Outcome::Created(transaction))
            }
            Err(Error::Conflict) => Ok(Outcome::AlreadyMaterialized),
            Err(error) => Err(error),
        }
    }
}

fn malformed_definition_id(error: &Error) -> Option<RecurringExpenseId> {
    match error {
        Error::MalformedDefinition(id, _) => Some(*id),
        _ => None,
    }
}
