//! Resolves canonical timezone names for calendar math.

use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, OffsetResult, PrimitiveDateTimeExt, TimeZone, Tz};

use crate::Error;

/// The timezone that calendar days, months and years are read in.
///
/// A named zone may change its offset during the year, so instants must be
/// resolved with the offset in force at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTimezone {
    /// An offset that never changes, e.g. UTC.
    Fixed(UtcOffset),
    /// A zone from the IANA database, e.g. "Europe/Paris".
    Named(&'static Tz),
}

impl LocalTimezone {
    /// Look up the canonical timezone `name`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the name is not a known canonical timezone.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        if name == "UTC" {
            return Ok(Self::Fixed(UtcOffset::UTC));
        }

        time_tz::timezones::get_by_name(name)
            .map(Self::Named)
            .ok_or_else(|| Error::InvalidTimezone(name.to_owned()))
    }

    /// The offset in force at the instant `at`.
    pub fn offset_at(&self, at: OffsetDateTime) -> UtcOffset {
        match self {
            Self::Fixed(offset) => *offset,
            Self::Named(tz) => tz.get_offset_utc(&at).to_utc(),
        }
    }

    /// The earliest instant at which the local wall clock reads `local`.
    pub fn earliest_instant(&self, local: PrimitiveDateTime) -> OffsetDateTime {
        self.resolve(local, OffsetDateTime::min)
    }

    /// The latest instant at which the local wall clock reads `local`.
    pub fn latest_instant(&self, local: PrimitiveDateTime) -> OffsetDateTime {
        self.resolve(local, OffsetDateTime::max)
    }

    fn resolve(
        &self,
        local: PrimitiveDateTime,
        pick: fn(OffsetDateTime, OffsetDateTime) -> OffsetDateTime,
    ) -> OffsetDateTime {
        let tz = match self {
            Self::Fixed(offset) => return local.assume_offset(*offset),
            Self::Named(tz) => *tz,
        };

        match local.assume_timezone(tz) {
            OffsetResult::Some(instant) => instant,
            OffsetResult::Ambiguous(first, second) => pick(first, second),
            // The clocks skipped over `local`: use the offset from before the jump.
            OffsetResult::None => {
                let before_jump = tz.get_offset_utc(&(local.assume_utc() - Duration::DAY));
                local.assume_offset(before_jump.to_utc())
            }
        }
    }
}

impl From<UtcOffset> for LocalTimezone {
    fn from(offset: UtcOffset) -> Self {
        Self::Fixed(offset)
    }
}
