//! Calendar-day normalization
//!
//! Every entry date is reduced to a local calendar day before it is grouped,
//! ordered or compared. Keys are rendered as `YYYY-MM-DD`.
//!
//! Normalization is fallible everywhere: input that cannot be read as a date
//! is reported as [`TrackerError::InvalidDate`] rather than mapped to a
//! sentinel key.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TrackerError;

/// Canonical key format
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Wall-clock formats accepted for strings without an offset. They are read
/// as local time, so only the date part matters.
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const LOCAL_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

/// A local calendar date, the grouping and ordering key for entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, TrackerError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                TrackerError::InvalidDate(format!("{year:04}-{month:02}-{day:02}"))
            })
    }

    /// Today's date on the local clock
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Shift by a signed number of days; `None` past chrono's date range
    pub fn offset(&self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(Duration::days(days)).map(Self)
    }

    /// Whole calendar days from `self` to `later` (negative when `later` is
    /// earlier)
    pub fn days_until(&self, later: CalendarDay) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// Local midnight of this day as a wall-clock time
    pub fn start_of_day(&self) -> NaiveDateTime {
        self.0.and_time(chrono::NaiveTime::MIN)
    }

    /// Every day from `self` through `end`, inclusive. Empty when `end`
    /// precedes `self`.
    pub fn through(self, end: CalendarDay) -> impl Iterator<Item = CalendarDay> {
        self.0
            .iter_days()
            .take_while(move |d| *d <= end.0)
            .map(CalendarDay)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = TrackerError;

    /// Parses the canonical `YYYY-MM-DD` key only
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_canonical_key(s) {
            return Err(TrackerError::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Self)
            .map_err(|_| TrackerError::InvalidDate(s.to_string()))
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Any date representation a caller may hand us
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayInput {
    /// Unix timestamp in milliseconds
    Timestamp(i64),
    /// `YYYY-MM-DD` key, RFC 3339 instant, or local wall-clock string
    Text(String),
    Date(NaiveDate),
    /// Local wall-clock time
    Local(NaiveDateTime),
    /// Absolute instant, reinterpreted in the local zone
    Instant(DateTime<FixedOffset>),
}

impl DayInput {
    /// Normalize against the local time zone
    pub fn to_day(&self) -> Result<CalendarDay, TrackerError> {
        self.to_day_in(&Local)
    }

    /// Normalize against an explicit time zone
    pub fn to_day_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<CalendarDay, TrackerError> {
        match self {
            DayInput::Text(raw) => parse_text(raw, tz),
            DayInput::Timestamp(millis) => tz
                .timestamp_millis_opt(*millis)
                .single()
                .map(|dt| CalendarDay(dt.date_naive()))
                .ok_or_else(|| TrackerError::InvalidDate(millis.to_string())),
            DayInput::Date(date) => Ok(CalendarDay(*date)),
            DayInput::Local(wall) => Ok(CalendarDay(wall.date())),
            DayInput::Instant(instant) => Ok(CalendarDay(instant.with_timezone(tz).date_naive())),
        }
    }
}

impl From<&str> for DayInput {
    fn from(s: &str) -> Self {
        DayInput::Text(s.to_string())
    }
}

impl From<String> for DayInput {
    fn from(s: String) -> Self {
        DayInput::Text(s)
    }
}

impl From<i64> for DayInput {
    fn from(millis: i64) -> Self {
        DayInput::Timestamp(millis)
    }
}

impl From<NaiveDate> for DayInput {
    fn from(date: NaiveDate) -> Self {
        DayInput::Date(date)
    }
}

impl From<NaiveDateTime> for DayInput {
    fn from(wall: NaiveDateTime) -> Self {
        DayInput::Local(wall)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DayInput {
    fn from(instant: DateTime<Tz>) -> Self {
        DayInput::Instant(instant.fixed_offset())
    }
}

impl From<CalendarDay> for DayInput {
    fn from(day: CalendarDay) -> Self {
        DayInput::Date(day.0)
    }
}

/// Normalize any date representation to a local calendar day.
///
/// A string already in `YYYY-MM-DD` form is taken as that day with no time
/// zone reinterpretation, so normalizing twice gives the same key.
pub fn normalize_day(input: impl Into<DayInput>) -> Result<CalendarDay, TrackerError> {
    input.into().to_day()
}

/// [`normalize_day`] against an explicit time zone
pub fn normalize_day_in<Tz: TimeZone>(
    input: impl Into<DayInput>,
    tz: &Tz,
) -> Result<CalendarDay, TrackerError> {
    input.into().to_day_in(tz)
}

/// Whole calendar days from `earlier` to `later`
pub fn days_between(earlier: CalendarDay, later: CalendarDay) -> i64 {
    earlier.days_until(later)
}

/// True for exactly four digits, dash, two digits, dash, two digits
pub fn is_canonical_key(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn parse_text<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<CalendarDay, TrackerError> {
    if is_canonical_key(raw) {
        return raw.parse();
    }

    let trimmed = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(CalendarDay(instant.with_timezone(tz).date_naive()));
    }

    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(wall) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(CalendarDay(wall.date()));
        }
    }

    for format in LOCAL_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(CalendarDay(date));
        }
    }

    Err(TrackerError::InvalidDate(raw.to_string()))
}
