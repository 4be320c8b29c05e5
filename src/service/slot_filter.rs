use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::clients::CalendarClient;
use crate::error::CalendarError;
use crate::models::rules::SchedulingRules;

/// Checks the one-slot window starting at `start` against the whole day's
/// events.
pub async fn is_slot_free_at<C: CalendarClient + ?Sized>(
    calendar: &C,
    rules: &SchedulingRules,
    start: NaiveDateTime,
) -> Result<bool, CalendarError> {
    let Some(slot_start) = rules.localize(start) else {
        warn!(%start, "slot start does not exist in local time");
        return Ok(false);
    };
    let slot_end = slot_start + rules.slot_length;
    let Some((day_start, day_end)) = rules.day_bounds(start.date()) else {
        return Err(CalendarError::LocalTime(start.date().to_string()));
    };

    let events = calendar.list_events(day_start, day_end).await?;
    for event in &events {
        if event.lists_time(start.time()) {
            debug!(summary = %event.summary, time = %start.time().format("%H:%M"), "slot list contains time");
            return Ok(false);
        }
        let window = match event.window_in(&rules.timezone) {
            Ok(Some(window)) => window,
            Ok(None) => continue,
            Err(err) => {
                warn!(summary = %event.summary, error = %err, "skipping event with unreadable times");
                continue;
            }
        };
        if overlaps(window.start, window.end, slot_start, slot_end) {
            debug!(
                summary = %event.summary,
                start = %window.start.format("%H:%M"),
                end = %window.end.format("%H:%M"),
                "found overlapping event"
            );
            return Ok(false);
        }
    }
    Ok(true)
}

/// Occupied when the event holds the slot start or the slot end.
fn overlaps(
    event_start: DateTime<Tz>,
    event_end: DateTime<Tz>,
    slot_start: DateTime<Tz>,
    slot_end: DateTime<Tz>,
) -> bool {
    (event_start <= slot_start && slot_start < event_end)
        || (event_start < slot_end && slot_end <= event_end)
}
