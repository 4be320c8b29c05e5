use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a caller-supplied date and time into a wall-clock datetime.
///
/// Accepted shapes, first match wins:
/// `2026-10-20 03:30 PM`, `2026-10-20 10:30`, `Tuesday, October 20 10:30`,
/// `October 20 10:30`, `20/10/2026 10:30`. Dates without a year resolve to
/// the next occurrence on or after `today`.
pub fn parse_slot_datetime(date: &str, time: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let date = date.trim();
    let time = time.trim();
    let combined = format!("{} {}", date, time);

    if let Ok(parsed) = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %I:%M %p") {
        return Some(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M") {
        return Some(parsed);
    }

    let clock = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    let day = month_day_date(date, today)
        .or_else(|| NaiveDate::parse_from_str(date, "%d/%m/%Y").ok())?;
    Some(day.and_time(clock))
}

/// `Tuesday, October 20` or `October 20`, with the weekday ignored.
fn month_day_date(date: &str, today: NaiveDate) -> Option<NaiveDate> {
    let month_day = match date.split_once(',') {
        Some((_, rest)) => rest.trim(),
        None => date,
    };
    let this_year = NaiveDate::parse_from_str(&format!("{} {}", month_day, today.year()), "%B %d %Y").ok()?;
    if this_year >= today {
        Some(this_year)
    } else {
        NaiveDate::parse_from_str(&format!("{} {}", month_day, today.year() + 1), "%B %d %Y").ok()
    }
}
