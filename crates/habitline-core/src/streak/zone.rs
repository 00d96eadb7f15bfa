//! Calendar-day normalization policy.
//!
//! A completion marker is a point in time; a streak counts calendar days.
//! [`CalendarZone`] is the single place that decides which zone a timestamp
//! is truncated in. The same zone must be used to compute "today" and to
//! normalize stored markers, otherwise day boundaries drift between write
//! and read.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest accepted fixed offset, exclusive (chrono rejects a full day).
const MAX_OFFSET_MINUTES: i32 = 24 * 60;

/// Zone used to map completion timestamps onto calendar days.
///
/// Serialized as `"local"`, `"utc"` or a signed offset such as `"+05:30"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CalendarZone {
    /// The machine's local zone, DST-aware
    #[default]
    Local,
    /// Coordinated Universal Time
    Utc,
    /// Fixed offset east of UTC, in minutes
    Fixed { offset_minutes: i32 },
}

impl CalendarZone {
    /// Build a fixed-offset zone, rejecting offsets of a day or more.
    pub fn fixed(offset_minutes: i32) -> Result<Self, ValidationError> {
        if offset_minutes.abs() >= MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidZone(format_offset(offset_minutes)));
        }
        Ok(Self::Fixed { offset_minutes })
    }

    fn fixed_offset(offset_minutes: i32) -> Option<FixedOffset> {
        FixedOffset::east_opt(offset_minutes.checked_mul(60)?)
    }

    /// Calendar day on which `ts` falls in this zone.
    pub fn calendar_day(&self, ts: DateTime<Utc>) -> NaiveDate {
        match *self {
            CalendarZone::Local => ts.with_timezone(&Local).date_naive(),
            CalendarZone::Utc => ts.date_naive(),
            CalendarZone::Fixed { offset_minutes } => match Self::fixed_offset(offset_minutes) {
                Some(offset) => ts.with_timezone(&offset).date_naive(),
                None => ts.date_naive(),
            },
        }
    }

    /// The first instant of `day` in this zone, as UTC.
    ///
    /// This is the marker written when a habit is completed for `day`.
    /// For local zones where midnight does not exist (DST gaps) the earliest
    /// valid instant of the day is used instead.
    pub fn start_of_day(&self, day: NaiveDate) -> DateTime<Utc> {
        let midnight = day.and_time(NaiveTime::MIN);
        let resolved = match *self {
            CalendarZone::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                .or_else(|| {
                    (1..24).find_map(|hour| {
                        let later = day.and_hms_opt(hour, 0, 0)?;
                        Local.from_local_datetime(&later).earliest()
                    })
                })
                .map(|dt| dt.with_timezone(&Utc)),
            CalendarZone::Utc => Some(midnight.and_utc()),
            CalendarZone::Fixed { offset_minutes } => Self::fixed_offset(offset_minutes)
                .and_then(|offset| offset.from_local_datetime(&midnight).single())
                .map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.unwrap_or_else(|| midnight.and_utc())
    }

    /// Today's date in this zone. Only command boundaries call this; the
    /// engine itself always receives an explicit date.
    pub fn today(&self) -> NaiveDate {
        self.calendar_day(Utc::now())
    }
}

fn format_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let abs = offset_minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// One or two ASCII digits, no sign.
fn is_offset_field(field: &str) -> bool {
    (1..=2).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
}

fn parse_offset(s: &str) -> Option<i32> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    if !is_offset_field(hours) || !is_offset_field(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

impl fmt::Display for CalendarZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CalendarZone::Local => f.write_str("local"),
            CalendarZone::Utc => f.write_str("utc"),
            CalendarZone::Fixed { offset_minutes } => f.write_str(&format_offset(offset_minutes)),
        }
    }
}

impl FromStr for CalendarZone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => Ok(CalendarZone::Local),
            "utc" | "z" => Ok(CalendarZone::Utc),
            _ => {
                let minutes = parse_offset(trimmed)
                    .ok_or_else(|| ValidationError::InvalidZone(s.to_string()))?;
                CalendarZone::fixed(minutes).map_err(|_| ValidationError::InvalidZone(s.to_string()))
            }
        }
    }
}

impl TryFrom<String> for CalendarZone {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarZone> for String {
    fn from(zone: CalendarZone) -> Self {
        zone.to_string()
    }
}
