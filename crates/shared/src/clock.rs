use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

/// Hour of the morning at which a new news day begins.
pub const DEFAULT_CUTOFF_HOUR: u32 = 6;

/// Source of the current instant, carrying the local offset so callers can
/// read both the wall-clock time and the absolute moment from one reading.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().into()
    }
}

/// A frozen instant, handy for scheduled replays and tests.
impl Clock for DateTime<FixedOffset> {
    fn now(&self) -> DateTime<FixedOffset> {
        *self
    }
}

/// A frozen wall-clock time, read as UTC.
impl Clock for NaiveDateTime {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc.from_utc_datetime(self).into()
    }
}

/// The date a moment belongs to when days start at `cutoff_hour` instead of
/// midnight. Anything before the cutoff still counts as the previous day.
pub fn logical_date(now: NaiveDateTime, cutoff_hour: u32) -> NaiveDate {
    if now.hour() < cutoff_hour {
        (now - Duration::days(1)).date()
    } else {
        now.date()
    }
}
