//! Archive month aggregation and month range arithmetic.

use std::collections::BTreeMap;

use time::{Date, Month, OffsetDateTime, Time, UtcOffset, macros::format_description};
use time::format_description::FormatItem;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const MONTH_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [year]");

/// Number of posts created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCount {
    pub year: i32,
    pub month: u8,
    pub label: String,
    pub count: usize,
}

impl MonthCount {
    pub fn href(&self) -> String {
        format!("/archives/{}/{:02}", self.year, self.month)
    }
}

/// Group timestamps by (year, month) and return counts, most recent month first.
pub fn compute_month_counts<I>(dates: I) -> Vec<MonthCount>
where
    I: IntoIterator<Item = OffsetDateTime>,
{
    let mut counts: BTreeMap<(i32, u8), usize> = BTreeMap::new();
    for date in dates {
        *counts.entry((date.year(), u8::from(date.month()))).or_default() += 1;
    }

    counts
        .into_iter()
        .rev()
        .map(|((year, month), count)| MonthCount {
            year,
            month,
            label: month_label(year, month),
            count,
        })
        .collect()
}

/// Half-open UTC range `[first of month, first of next month)`.
///
/// Returns `None` for a month outside `1..=12` or a year `time` cannot represent.
pub fn month_range(year: i32, month: u8) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let month = Month::try_from(month).ok()?;
    let start = Date::from_calendar_date(year, month, 1).ok()?;
    let (next_year, next_month) = match month {
        Month::December => (year.checked_add(1)?, Month::January),
        other => (year, other.next()),
    };
    let end = Date::from_calendar_date(next_year, next_month, 1).ok()?;

    Some((
        start.with_time(Time::MIDNIGHT).assume_offset(UtcOffset::UTC),
        end.with_time(Time::MIDNIGHT).assume_offset(UtcOffset::UTC),
    ))
}

pub fn month_label(year: i32, month: u8) -> String {
    Month::try_from(month)
        .ok()
        .and_then(|month| Date::from_calendar_date(year, month, 1).ok())
        .and_then(|date| date.format(MONTH_LABEL_FORMAT).ok())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

pub fn human_date(value: OffsetDateTime) -> String {
    value
        .date()
        .format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| value.date().to_string())
}
