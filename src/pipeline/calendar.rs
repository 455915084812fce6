//! Urgency classifier over a Monday–Friday business calendar.
//!
//! No holiday calendar: every weekday is a business day.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::pipeline::types::Urgency;

/// Whether `date` falls on Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business days passed when walking forward from `from` until `to` is
/// reached. Each weekday stepped onto counts once; `from` itself never
/// counts. Returns 0 when `to <= from`.
///
/// Friday → following Monday is 1; Wednesday → Friday is 2.
pub fn business_days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut day = from;
    let mut count = 0;
    while day < to {
        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
        if is_business_day(day) {
            count += 1;
        }
    }
    count
}

/// Classify a due date against `today` and a horizon in business days.
///
/// - past due → [`Urgency::Overdue`]
/// - due today, or within `horizon` business days (inclusive) → [`Urgency::DueSoon`]
/// - anything later → [`Urgency::Ignored`]
pub fn classify(due_date: NaiveDate, today: NaiveDate, horizon_business_days: u32) -> Urgency {
    if due_date < today {
        return Urgency::Overdue;
    }
    if business_days_between(today, due_date) <= horizon_business_days {
        Urgency::DueSoon
    } else {
        Urgency::Ignored
    }
}
