//! Cron-style recurrence
//!
//! A schedule recurs on the values of its `hour` field, on the days matched
//! by its `day_of_week` field. Both fields use cron syntax: `*`, `N`, `A-B`,
//! `*/S`, `A-B/S`, `N/S` and comma lists. Days are `0`-`6` from Monday or
//! `mon`-`sun`.
//!
//! How `hour` is read is configurable. [`HourField::Hour`] fires once at the
//! top of each listed hour. [`HourField::Second`] is the legacy reading that
//! treats the values as seconds: the reminder then fires every minute at each
//! listed second.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day names accepted in a day-of-week field, Monday first
const DAY_NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Interpretation of a descriptor's `hour` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HourField {
    /// Values are hours of the day (0-23), fired at `HH:00:00`
    #[default]
    Hour,
    /// Values are seconds of the minute (0-59), fired every minute
    Second,
}

impl HourField {
    fn bounds(self) -> (u32, u32) {
        match self {
            HourField::Hour => (0, 23),
            HourField::Second => (0, 59),
        }
    }
}

/// Cron field parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("empty expression")]
    Empty,
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error("{value} is outside {min}-{max}")]
    OutOfRange { value: u32, min: u32, max: u32 },
    #[error("range '{0}' runs backwards")]
    InvalidRange(String),
    #[error("step in '{0}' must be a positive number")]
    InvalidStep(String),
}

/// Set of matching values of one cron field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronField {
    /// Bit `n` set when value `n` matches
    mask: u64,
}

impl CronField {
    /// Parse `expr` for values in `min..=max`, optionally accepting names
    /// that map to `min`, `min + 1`, ...
    pub fn parse(expr: &str, min: u32, max: u32, names: &[&str]) -> Result<Self, RecurrenceError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(RecurrenceError::Empty);
        }

        let mut mask = 0u64;
        for item in expr.split(',') {
            let item = item.trim();
            let (base, step) = match item.split_once('/') {
                Some((base, step)) => {
                    let step: u32 = step
                        .trim()
                        .parse()
                        .map_err(|_| RecurrenceError::InvalidStep(item.into()))?;
                    if step == 0 {
                        return Err(RecurrenceError::InvalidStep(item.into()));
                    }
                    (base.trim(), Some(step))
                }
                None => (item, None),
            };

            let (lo, hi) = if base == "*" {
                (min, max)
            } else if let Some((a, b)) = base.split_once('-') {
                let a = value(a, min, max, names)?;
                let b = value(b, min, max, names)?;
                if a > b {
                    return Err(RecurrenceError::InvalidRange(item.into()));
                }
                (a, b)
            } else {
                let v = value(base, min, max, names)?;
                // `N/S` runs from N to the end of the range
                (v, if step.is_some() { max } else { v })
            };

            let step = step.unwrap_or(1);
            let mut v = lo;
            while v <= hi {
                mask |= 1 << v;
                v += step;
            }
        }

        Ok(Self { mask })
    }

    /// Whether `v` matches
    pub fn matches(&self, v: u32) -> bool {
        v < 64 && self.mask & (1 << v) != 0
    }

    /// Matching values in ascending order
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        (0..64).filter(move |&v| self.matches(v))
    }
}

fn value(text: &str, min: u32, max: u32, names: &[&str]) -> Result<u32, RecurrenceError> {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    let v = match names.iter().position(|n| *n == lower) {
        Some(i) => min + i as u32,
        None => text
            .parse()
            .map_err(|_| RecurrenceError::InvalidNumber(text.into()))?,
    };
    if v < min || v > max {
        return Err(RecurrenceError::OutOfRange { value: v, min, max });
    }
    Ok(v)
}

/// When a schedule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    field: HourField,
    values: CronField,
    days: CronField,
}

impl Recurrence {
    /// Parse the `hour` and optional `day_of_week` fields
    pub fn new(hour: &str, day_of_week: Option<&str>, field: HourField) -> Result<Self, RecurrenceError> {
        let (min, max) = field.bounds();
        Ok(Self {
            field,
            values: CronField::parse(hour, min, max, &[])?,
            days: Self::parse_days(day_of_week.unwrap_or("*"))?,
        })
    }

    /// Parse a day-of-week field on its own
    pub fn parse_days(expr: &str) -> Result<CronField, RecurrenceError> {
        CronField::parse(expr, 0, 6, &DAY_NAMES)
    }

    /// How the `hour` values are read
    pub fn field(&self) -> HourField {
        self.field
    }

    /// First firing time strictly after `after`
    ///
    /// Looks at most a week ahead, which always covers a non-empty day set.
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let start = after.date();
        (0..=7u64)
            .filter_map(|i| start.checked_add_days(Days::new(i)))
            .filter(|day| self.days.matches(day.weekday().num_days_from_monday()))
            .find_map(|day| self.first_on(day, after))
    }

    fn first_on(&self, day: NaiveDate, after: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.field {
            HourField::Hour => self
                .values
                .values()
                .filter_map(|h| day.and_hms_opt(h, 0, 0))
                .find(|t| *t > after),
            HourField::Second => {
                // Start from the minute of `after` when it is the same day
                let first_minute = if day == after.date() {
                    after.hour() * 60 + after.minute()
                } else {
                    0
                };
                (first_minute..24 * 60).find_map(|m| {
                    self.values
                        .values()
                        .filter_map(|s| day.and_hms_opt(m / 60, m % 60, s))
                        .find(|t| *t > after)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_forms() {
        let f = CronField::parse("1,3-5,*/20", 0, 59, &[]).unwrap();
        let values: Vec<u32> = f.values().collect();
        assert_eq!(values, vec![0, 1, 3, 4, 5, 20, 40]);

        let f = CronField::parse("50/4", 0, 59, &[]).unwrap();
        assert_eq!(f.values().collect::<Vec<_>>(), vec![50, 54, 58]);
    }

    #[test]
    fn test_parse_day_names() {
        let f = Recurrence::parse_days("mon-wed,Sun").unwrap();
        assert_eq!(f.values().collect::<Vec<_>>(), vec![0, 1, 2, 6]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(CronField::parse("", 0, 23, &[]), Err(RecurrenceError::Empty));
        assert!(matches!(
            CronField::parse("24", 0, 23, &[]),
            Err(RecurrenceError::OutOfRange { value: 24, .. })
        ));
        assert!(matches!(
            CronField::parse("5-2", 0, 23, &[]),
            Err(RecurrenceError::InvalidRange(_))
        ));
        assert!(matches!(
            CronField::parse("*/0", 0, 23, &[]),
            Err(RecurrenceError::InvalidStep(_))
        ));
        assert!(matches!(
            CronField::parse("noon", 0, 23, &[]),
            Err(RecurrenceError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_hour_mode_fires_on_the_hour() {
        let r = Recurrence::new("8,20", None, HourField::Hour).unwrap();
        // 2024-01-01 is a Monday
        assert_eq!(r.next_after(at(2024, 1, 1, 7, 30, 0)), Some(at(2024, 1, 1, 8, 0, 0)));
        assert_eq!(r.next_after(at(2024, 1, 1, 8, 0, 0)), Some(at(2024, 1, 1, 20, 0, 0)));
        assert_eq!(r.next_after(at(2024, 1, 1, 21, 0, 0)), Some(at(2024, 1, 2, 8, 0, 0)));
    }

    #[test]
    fn test_hour_mode_respects_days() {
        let r = Recurrence::new("9", Some("sat,sun"), HourField::Hour).unwrap();
        assert_eq!(r.next_after(at(2024, 1, 1, 12, 0, 0)), Some(at(2024, 1, 6, 9, 0, 0)));
        assert_eq!(r.next_after(at(2024, 1, 7, 9, 0, 0)), Some(at(2024, 1, 13, 9, 0, 0)));
    }

    #[test]
    fn test_hour_mode_rejects_large_values() {
        assert!(Recurrence::new("30", None, HourField::Hour).is_err());
        assert!(Recurrence::new("30", None, HourField::Second).is_ok());
    }

    #[test]
    fn test_second_mode_fires_every_minute() {
        // Legacy reading of `hour`: "8" means second 8 of every minute, so a
        // reminder meant for 08:00 repeats all day long.
        let r = Recurrence::new("8", None, HourField::Second).unwrap();
        assert_eq!(r.next_after(at(2024, 1, 1, 7, 30, 0)), Some(at(2024, 1, 1, 7, 30, 8)));
        assert_eq!(r.next_after(at(2024, 1, 1, 7, 30, 8)), Some(at(2024, 1, 1, 7, 31, 8)));
        assert_eq!(r.next_after(at(2024, 1, 1, 23, 59, 9)), Some(at(2024, 1, 2, 0, 0, 8)));
    }

    #[test]
    fn test_second_mode_respects_days() {
        let r = Recurrence::new("0", Some("tue"), HourField::Second).unwrap();
        assert_eq!(r.next_after(at(2024, 1, 1, 10, 0, 0)), Some(at(2024, 1, 2, 0, 0, 0)));
    }

    #[test]
    fn test_hour_field_serde_names() {
        let field: HourField = serde_json::from_str("\"second\"").unwrap();
        assert_eq!(field, HourField::Second);
        assert_eq!(serde_json::to_string(&HourField::Hour).unwrap(), "\"hour\"");
    }
}
