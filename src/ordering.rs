//! Display ordering of collections.
//!
//! Orders work on the raw JSON values so they can be driven by a
//! [`SortPolicy`] field name. Every sort is stable.

use std::cmp::{Ordering, Reverse};

use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::record::SortPolicy;

/// Events split at a reference day.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPartition<T> {
    /// On or after the reference day, soonest first.
    pub upcoming: Vec<T>,
    /// Before the reference day, most recent first; undated last.
    pub past: Vec<T>,
}

/// Today's date in the local time zone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// `parseInt`-style integer prefix: optional leading whitespace and sign,
/// then digits. `None` when there are no digits.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    // Digit runs past the i64 range saturate.
    let value = rest[..end].bytes().fold(0i64, |acc, b| {
        let digit = i64::from(b - b'0');
        let acc = acc.saturating_mul(10);
        if negative {
            acc.saturating_sub(digit)
        } else {
            acc.saturating_add(digit)
        }
    });
    Some(value)
}

/// Year of a record field for ordering. Non-numeric years count as 0.
pub fn year_of(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_leading_int(s).unwrap_or(0),
        _ => 0,
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// `YYYY-MM-DD` date of a record field.
pub fn date_of(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_date)
}

/// Newest year first.
pub fn sort_by_year_desc<T>(items: &mut [T], year: impl Fn(&T) -> i64) {
    items.sort_by_key(|item| Reverse(year(item)));
}

/// Most recent date first; items without a date keep their order at the end.
pub fn sort_by_date_desc<T>(items: &mut [T], date: impl Fn(&T) -> Option<NaiveDate>) {
    items.sort_by(|a, b| descending_dated(date(a), date(b)));
}

fn descending_dated(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Split events into upcoming (date on or after `today`) and past.
pub fn partition_events<T>(
    items: Vec<T>,
    today: NaiveDate,
    date: impl Fn(&T) -> Option<NaiveDate>,
) -> EventPartition<T> {
    let (mut upcoming, mut past): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| matches!(date(item), Some(d) if d >= today));

    upcoming.sort_by_key(|item| date(item));
    sort_by_date_desc(&mut past, &date);

    EventPartition { upcoming, past }
}

/// Order raw collection values by a category's policy.
///
/// `DateSplit` yields upcoming events followed by past events.
pub fn arrange(policy: SortPolicy, items: Vec<Value>, today: NaiveDate) -> Vec<Value> {
    match policy {
        SortPolicy::FileOrder => items,
        SortPolicy::YearDescending { field } => {
            let mut items = items;
            sort_by_year_desc(&mut items, |v| v.get(field).map_or(0, year_of));
            items
        }
        SortPolicy::SortDateDescending { field } => {
            let mut items = items;
            sort_by_date_desc(&mut items, |v| v.get(field).and_then(date_of));
            items
        }
        SortPolicy::DateSplit { field } => {
            let split = partition_events(items, today, |v| v.get(field).and_then(date_of));
            split.upcoming.into_iter().chain(split.past).collect()
        }
    }
}
