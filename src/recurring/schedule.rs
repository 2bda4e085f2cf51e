//! Runs the materialization job once per month in the background.

use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;

use crate::{
    Error,
    period::PeriodWindow,
    recurring::{Interval, RecurringMaterializationJob, RunSummary},
    stores::{RecurrenceStore, TransactionStore},
    timezone::LocalTimezone,
};

/// How long to wait before trying again after a store could not be reached.
pub const RETRY_DELAY: Duration = Duration::from_secs(5 * 60);

/// Run the monthly and annual passes of `job` now, then again at the start of
/// every following month in the job's timezone.
///
/// A pass that fails because a store is unavailable is retried after
/// [RETRY_DELAY].
///
/// This function only returns if the start of the next month cannot be computed.
pub async fn run_schedule<R, T>(job: Arc<RecurringMaterializationJob<R, T>>) -> Result<(), Error>
where
    R: RecurrenceStore + Send + Sync + 'static,
    T: TransactionStore + Send + Sync + 'static,
{
    let timezone = job.timezone();

    loop {
        let now = OffsetDateTime::now_utc();

        let delay = match materialize_all(job.clone(), now).await {
            Ok(_) => duration_until_next_month(now, timezone)?,
            Err(error) => {
                tracing::warn!(
                    "Recurring expense run failed, retrying in {} seconds: {error}",
                    RETRY_DELAY.as_secs()
                );
                RETRY_DELAY
            }
        };

        tracing::debug!("Next recurring expense run in {} seconds", delay.as_secs());
        tokio::time::sleep(delay).await;
    }
}

/// Run the monthly pass and then the annual pass of `job` on the blocking
/// thread pool.
///
/// # Returns
/// The monthly and annual run summaries, in that order.
pub async fn materialize_all<R, T>(
    job: Arc<RecurringMaterializationJob<R, T>>,
    now: OffsetDateTime,
) -> Result<(RunSummary, RunSummary), Error>
where
    R: RecurrenceStore + Send + Sync + 'static,
    T: TransactionStore + Send + Sync + 'static,
{
    tokio::task::spawn_blocking(move || {
        let monthly = job.run(now)?;
        let annual = job.run_annual(now)?;
        Ok((monthly, annual))
    })
    .await
    .map_err(|error| Error::JobAborted(error.to_string()))?
}

/// The time from `now` until the first instant of the next month in `timezone`.
pub fn duration_until_next_month(
    now: OffsetDateTime,
    timezone: impl Into<LocalTimezone>,
) -> Result<Duration, Error> {
    let next_month = PeriodWindow::containing(now, Interval::Monthly, timezone)?.next()?;

    Ok(Duration::try_from(next_month.start - now).unwrap_or_default())
}
