use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::clients::CalendarClient;
use crate::error::CalendarError;
use crate::models::rules::SchedulingRules;

/// Whether a whole working day is still open for bookings.
///
/// A day closes when any event inside the working window is a slot list, or
/// when one event runs for the full-day threshold or covers the whole window.
pub async fn is_day_open<C: CalendarClient + ?Sized>(
    calendar: &C,
    rules: &SchedulingRules,
    date: NaiveDate,
) -> Result<bool, CalendarError> {
    let Some((day_start, day_end)) = rules.working_bounds(date) else {
        return Err(CalendarError::LocalTime(date.to_string()));
    };
    let events = calendar.list_events(day_start, day_end).await?;

    if let Some(list) = events.iter().find(|event| event.is_slot_list()) {
        info!(%date, summary = %list.summary, "day controlled by a slot list");
        return Ok(false);
    }

    for event in &events {
        let window = match event.window_in(&rules.timezone) {
            Ok(Some(window)) => window,
            Ok(None) => continue,
            Err(err) => {
                warn!(%date, summary = %event.summary, error = %err, "skipping event with unreadable times");
                continue;
            }
        };
        let hours = window.hours();
        if hours >= rules.full_day_hours || window.covers(day_start, day_end) {
            info!(
                %date,
                summary = %event.summary,
                start = %window.start.format("%H:%M"),
                end = %window.end.format("%H:%M"),
                hours,
                "found a full-day booking"
            );
            return Ok(false);
        }
        debug!(%date, summary = %event.summary, hours, "not a full-day booking");
    }

    Ok(true)
}
