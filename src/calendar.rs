//! Date bucketing and month grid construction for the calendar view.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::domain::session::{DATE_FORMAT, SessionDisplay};
use crate::dto::calendar::{CalendarDay, CalendarWeek};

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Sessions grouped by their `YYYY-MM-DD` date.
///
/// Dates without sessions have no entry, and every bucket keeps the order in
/// which sessions were fed in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionsByDate {
    buckets: HashMap<String, Vec<SessionDisplay>>,
}

impl SessionsByDate {
    pub fn build<I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = SessionDisplay>,
    {
        let mut buckets: HashMap<String, Vec<SessionDisplay>> = HashMap::new();
        for session in sessions {
            buckets
                .entry(session.date.clone())
                .or_default()
                .push(session);
        }
        Self { buckets }
    }

    /// Sessions on `date`, empty when there are none.
    pub fn sessions_on(&self, date: NaiveDate) -> &[SessionDisplay] {
        self.get(&date.format(DATE_FORMAT).to_string())
    }

    pub fn get(&self, key: &str) -> &[SessionDisplay] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of dates holding at least one session.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sessions across every bucket.
    pub fn total_sessions(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// First day of the given month, `None` for an invalid month.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn first_of_next_month(first: NaiveDate) -> Option<NaiveDate> {
    if first.month() == 12 {
        first_of_month(first.year() + 1, 1)
    } else {
        first_of_month(first.year(), first.month() + 1)
    }
}

/// Number of days in the month starting at `first`.
pub fn days_in_month(first: NaiveDate) -> u32 {
    match first_of_next_month(first) {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}

/// Spanish label such as `mayo de 2024`.
pub fn month_label(month: NaiveDate) -> String {
    let name = MONTH_NAMES[month.month0() as usize];
    format!("{name} de {}", month.year())
}

/// Builds the Monday-first week grid for the month containing `month`.
///
/// The grid starts with the tail of the previous month needed to reach a
/// Monday, then every day of the month, then the head of the next month
/// needed to complete the last week. `today` only drives the `is_today` flag.
pub fn build_month_grid(
    month: NaiveDate,
    sessions: &SessionsByDate,
    today: NaiveDate,
) -> Vec<CalendarWeek> {
    let Some(first) = month.with_day(1) else {
        return Vec::new();
    };

    let leading = first.weekday().num_days_from_monday() as usize;
    let current = days_in_month(first) as usize;
    let trailing = (7 - (leading + current) % 7) % 7;
    let total = leading + current + trailing;

    let Some(grid_start) = first.checked_sub_days(Days::new(leading as u64)) else {
        log::warn!("Month {first} is out of the supported date range");
        return Vec::new();
    };

    let days: Vec<CalendarDay> = grid_start
        .iter_days()
        .take(total)
        .map(|date| {
            let on_date = sessions.sessions_on(date);
            CalendarDay {
                date,
                day: date.day(),
                is_today: date == today,
                is_current_month: date.year() == first.year() && date.month() == first.month(),
                session_count: on_date.len(),
                sessions: on_date.to_vec(),
            }
        })
        .collect();

    days.chunks_exact(7)
        .map(|week| CalendarWeek {
            days: std::array::from_fn(|i| week[i].clone()),
        })
        .collect()
}
