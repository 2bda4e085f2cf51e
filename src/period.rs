//! Calendar windows for the periods that recurring expenses are materialized in.
//!
//! All windows are built for an explicit [LocalTimezone] rather than the
//! machine's local timezone, so the same instant always maps to the same month
//! no matter where the server runs. Each bound is resolved with the offset in
//! force at that bound, so a month that spans a daylight saving change still
//! starts and ends at local midnight.

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::{Error, recurring::Interval, timezone::LocalTimezone};

/// A calendar month or year expressed both as calendar dates and as instants.
///
/// Both pairs of bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    /// Whether the window covers a month or a year.
    pub interval: Interval,
    /// The first calendar day of the period.
    pub first_day: Date,
    /// The last calendar day of the period.
    pub last_day: Date,
    /// The first instant of the period, i.e. midnight on `first_day`.
    pub start: OffsetDateTime,
    /// The last instant of the period, i.e. the final nanosecond of `last_day`.
    pub end: OffsetDateTime,
    /// The timezone the calendar days are read in.
    pub timezone: LocalTimezone,
}

/// Build the window for `month` of `year` in `timezone`, which may also be a
/// fixed [time::UtcOffset].
///
/// # Errors
/// Returns [Error::InvalidCalendarValue] if `year` is outside the range
/// supported by [time].
pub fn month_window(
    year: i32,
    month: Month,
    timezone: impl Into<LocalTimezone>,
) -> Result<PeriodWindow, Error> {
    let first_day = Date::from_calendar_date(year, month, 1)?;
    let last_day = Date::from_calendar_date(year, month, days_in_month(year, month))?;

    PeriodWindow::from_dates(Interval::Monthly, first_day, last_day, timezone.into())
}

/// Build the window for the calendar `year` in `timezone`.
///
/// # Errors
/// Returns [Error::InvalidCalendarValue] if `year` is outside the range
/// supported by [time].
pub fn year_window(year: i32, timezone: impl Into<LocalTimezone>) -> Result<PeriodWindow, Error> {
    let first_day = Date::from_calendar_date(year, Month::January, 1)?;
    let last_day = Date::from_calendar_date(year, Month::December, 31)?;

    PeriodWindow::from_dates(Interval::Annual, first_day, last_day, timezone.into())
}

impl PeriodWindow {
    /// Build the window of the month or year that `now` falls in, as seen from `timezone`.
    pub fn containing(
        now: OffsetDateTime,
        interval: Interval,
        timezone: impl Into<LocalTimezone>,
    ) -> Result<Self, Error> {
        let timezone = timezone.into();
        let local_now = now.to_offset(timezone.offset_at(now));

        match interval {
            Interval::Monthly => month_window(local_now.year(), local_now.month(), timezone),
            Interval::Annual => year_window(local_now.year(), timezone),
        }
    }

    fn from_dates(
        interval: Interval,
        first_day: Date,
        last_day: Date,
        timezone: LocalTimezone,
    ) -> Result<Self, Error> {
        let end_of_day = Time::from_hms_nano(23, 59, 59, 999_999_999)?;

        Ok(Self {
            interval,
            first_day,
            last_day,
            start: timezone.earliest_instant(PrimitiveDateTime::new(first_day, Time::MIDNIGHT)),
            end: timezone.latest_instant(PrimitiveDateTime::new(last_day, end_of_day)),
            timezone,
        })
    }

    #[cfg(test)]
    fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Whether the lifespan `[start_date, end_date]` overlaps the window.
    ///
    /// An `end_date` of `None` means the lifespan never ends.
    pub fn overlaps(&self, start_date: Date, end_date: Option<Date>) -> bool {
        start_date <= self.last_day && end_date.is_none_or(|end_date| end_date >= self.first_day)
    }

    /// The key that identifies the period, "YYYY-MM" for months and "YYYY" for years.
    pub fn key(&self) -> String {
        match self.interval {
            Interval::Monthly => format!(
                "{:04}-{:02}",
                self.first_day.year(),
                u8::from(self.first_day.month())
            ),
            Interval::Annual => format!("{:04}", self.first_day.year()),
        }
    }

    /// The window for the period directly after this one.
    pub fn next(&self) -> Result<Self, Error> {
        let timezone = self.timezone;

        match self.interval {
            Interval::Monthly => {
                let month = self.first_day.month();
                let year = if month == Month::December {
                    self.first_day.year() + 1
                } else {
                    self.first_day.year()
                };

                month_window(year, month.next(), timezone)
            }
            Interval::Annual => year_window(self.first_day.year() + 1, timezone),
        }
    }
}

/// Parse a month in the form "YYYY-MM" (the month may also be written without
/// the leading zero, e.g. "2024-3").
///
/// # Errors
/// Returns [Error::InvalidMonth] if `text` is not a valid year and month.
pub fn parse_month(text: &str) -> Result<(i32, Month), Error> {
    let invalid = || Error::InvalidMonth(text.to_owned());

    let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Ok((year, month))
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
