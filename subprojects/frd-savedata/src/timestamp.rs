//! Timestamp encodings used by friend records.
//!
//! Two encodings coexist:
//! - [`FormattedTimestamp`]: calendar fields packed into a `u64`, used by the IPC-facing
//!   [`FriendInfo`](crate::raw::friend::FriendInfo) layout.
//! - [`SystemTimestamp`]: milliseconds since the console epoch (2000-01-01 00:00:00), used by
//!   the current on-disk [`FriendEntry`](crate::raw::friend::FriendEntry) layout.
//!
//! Day counting follows the sysmodule: years start in March so that leap days fall at the end
//! of the year, and January/February of 2000 are counted from 1.

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::U64};

/// Milliseconds between the unix epoch and the console epoch.
pub const CONSOLE_EPOCH_UNIX_MILLIS: u64 = 946_684_800_000;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: u64 = 24 * MILLIS_PER_HOUR;

/// Days in 400 years, including leap days.
const DAYS_PER_400_YEARS: u32 = 146_097;
/// Days in 100 years, including leap days.
const DAYS_PER_100_YEARS: u32 = 36_524;
/// Days in 4 years, including the leap day.
const DAYS_PER_4_YEARS: u32 = 1_461;

/// A calendar date relative to the console epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonthDate {
    pub year: u16,
    pub month: u16,
    pub day: u16,
}

impl Default for YearMonthDate {
    fn default() -> Self {
        Self {
            year: 2000,
            month: 1,
            day: 1,
        }
    }
}

impl YearMonthDate {
    pub const fn new(year: u16, month: u16, day: u16) -> Self {
        Self { year, month, day }
    }

    /// Converts a day count produced by [`FormattedTimestamp::days_since_epoch`] back into a
    /// calendar date.
    pub fn from_days_since_epoch(days: u32) -> Self {
        if days < 60 {
            if days == 0 {
                return Self::default();
            }

            // Only January or February can be reached here
            let zero_indexed_month = (days / 32) as u16;
            return Self::new(
                2000,
                zero_indexed_month + 1,
                (days % 32) as u16 + zero_indexed_month,
            );
        }

        // Count from March 1st 2000
        let adjusted = days - 60;

        let number_of_400_years = adjusted / DAYS_PER_400_YEARS;
        let rem_400 = adjusted % DAYS_PER_400_YEARS;

        let number_of_100_years = rem_400 / DAYS_PER_100_YEARS;
        let rem_100 = rem_400 % DAYS_PER_100_YEARS;

        let number_of_4_years = rem_100 / DAYS_PER_4_YEARS;
        let rem_4 = rem_100 % DAYS_PER_4_YEARS;

        let number_of_1_years = rem_4 / 365;
        let rem_1 = rem_4 % 365;

        let mut year = 2000
            + number_of_400_years * 400
            + number_of_100_years * 100
            + number_of_4_years * 4
            + number_of_1_years;
        let mut month = (rem_1 * 5 + 2) / 153;
        let mut day = rem_1 - (month * 153 + 2) / 5 + 1;

        if number_of_1_years == 4 || number_of_100_years == 4 {
            month = 2;
            day = 29;
        } else if month < 10 {
            month += 3;
        } else {
            year += 1;
            month = (month - 9).max(1);
        }

        Self::new(year as u16, month as u16, day as u16)
    }
}

/// Calendar time packed into a 64-bit word.
///
/// ```text
/// bits 26..42  year
/// bits 22..26  month
/// bits 17..22  day
/// bits 12..17  hours
/// bits  6..12  minutes
/// bits  0..6   seconds
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(transparent)]
pub struct FormattedTimestamp(U64);

const_assert_eq!(size_of::<FormattedTimestamp>(), 0x8);

impl FormattedTimestamp {
    /// Packs calendar fields. Out-of-range values are masked to their bit width.
    pub fn new(year: u16, month: u16, day: u16, hours: u16, minutes: u16, seconds: u16) -> Self {
        let raw = ((u64::from(year) & 0xFFFF) << 26)
            | ((u64::from(month) & 0xF) << 22)
            | ((u64::from(day) & 0x1F) << 17)
            | ((u64::from(hours) & 0x1F) << 12)
            | ((u64::from(minutes) & 0x3F) << 6)
            | (u64::from(seconds) & 0x3F);
        Self(U64::new(raw))
    }

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(U64::new(raw))
    }

    #[inline]
    pub fn raw(&self) -> u64 {
        self.0.get()
    }

    pub fn year(&self) -> u16 {
        ((self.raw() >> 26) & 0xFFFF) as u16
    }

    pub fn month(&self) -> u16 {
        ((self.raw() >> 22) & 0xF) as u16
    }

    pub fn day(&self) -> u16 {
        ((self.raw() >> 17) & 0x1F) as u16
    }

    pub fn hours(&self) -> u16 {
        ((self.raw() >> 12) & 0x1F) as u16
    }

    pub fn minutes(&self) -> u16 {
        ((self.raw() >> 6) & 0x3F) as u16
    }

    pub fn seconds(&self) -> u16 {
        (self.raw() & 0x3F) as u16
    }

    /// Number of days since the console epoch.
    ///
    /// Dates before 2000 yield 0 instead of a negative count.
    pub fn days_since_epoch(&self) -> i32 {
        let year = i32::from(self.year());
        if year < 2000 {
            return 0;
        }

        // Start the year in March; January and February belong to the previous year
        let month = i32::from(self.month());
        let (adjusted_month, adjusted_year) = if month < 3 {
            (month + 9, year - 2001)
        } else {
            (month - 3, year - 2000)
        };

        let days_from_last_100_years = ((adjusted_year % 100) * DAYS_PER_4_YEARS as i32) / 4;
        let days_from_over_100_years_ago =
            ((adjusted_year / 100) * DAYS_PER_400_YEARS as i32) / 4;
        let days_from_current_year_months = (adjusted_month * 153 + 2) / 5;

        // 59 days for January and February
        days_from_current_year_months
            + days_from_last_100_years
            + days_from_over_100_years_ago
            + i32::from(self.day())
            + 59
    }
}

impl From<SystemTimestamp> for FormattedTimestamp {
    fn from(timestamp: SystemTimestamp) -> Self {
        let date = timestamp.year_month_date();
        Self::new(
            date.year,
            date.month,
            date.day,
            timestamp.hours(),
            timestamp.minutes(),
            timestamp.seconds(),
        )
    }
}

/// Milliseconds since the console epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(transparent)]
pub struct SystemTimestamp(U64);

const_assert_eq!(size_of::<SystemTimestamp>(), 0x8);

impl SystemTimestamp {
    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        Self(U64::new(millis))
    }

    /// Converts unix milliseconds. Times before the console epoch saturate to 0.
    pub fn from_unix_millis(unix_millis: u64) -> Self {
        Self::from_millis(unix_millis.saturating_sub(CONSOLE_EPOCH_UNIX_MILLIS))
    }

    #[inline]
    pub fn millis(&self) -> u64 {
        self.0.get()
    }

    pub fn unix_millis(&self) -> u64 {
        self.millis() + CONSOLE_EPOCH_UNIX_MILLIS
    }

    pub fn days_since_epoch(&self) -> u32 {
        (self.millis() / MILLIS_PER_DAY) as u32
    }

    pub fn year_month_date(&self) -> YearMonthDate {
        YearMonthDate::from_days_since_epoch(self.days_since_epoch())
    }

    pub fn hours(&self) -> u16 {
        ((self.millis() / MILLIS_PER_HOUR) % 24) as u16
    }

    pub fn minutes(&self) -> u16 {
        ((self.millis() / MILLIS_PER_MINUTE) % 60) as u16
    }

    pub fn seconds(&self) -> u16 {
        ((self.millis() / MILLIS_PER_SECOND) % 60) as u16
    }
}

impl From<FormattedTimestamp> for SystemTimestamp {
    fn from(timestamp: FormattedTimestamp) -> Self {
        let days = timestamp.days_since_epoch().max(0) as u64;
        Self::from_millis(
            days * MILLIS_PER_DAY
                + u64::from(timestamp.hours()) * MILLIS_PER_HOUR
                + u64::from(timestamp.minutes()) * MILLIS_PER_MINUTE
                + u64::from(timestamp.seconds()) * MILLIS_PER_SECOND,
        )
    }
}
