use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::clients::{CalendarClient, DistanceProvider};
use crate::error::{CalendarError, DistanceError};
use crate::models::event::{CalendarEvent, EventShape};
use crate::models::rules::{SchedulingRules, meters_to_miles};
use crate::models::slot::parse_clock_time;
use crate::service::address_parser::parse_event_address;

/// An existing stop on the tuner's day.
#[derive(Debug, Clone, PartialEq)]
pub struct BookedStop {
    pub at: DateTime<Tz>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Previous,
    Next,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Previous => "previous",
            Side::Next => "next",
        }
    }
}

/// Whether a slot keeps the day's circuit within the neighbour radius.
///
/// Only the bookings immediately before and after the slot are measured, and
/// only when their address can be resolved.
pub async fn is_geographically_compatible<C, D>(
    calendar: &C,
    distance: &D,
    rules: &SchedulingRules,
    date: NaiveDate,
    time: NaiveTime,
    candidate_address: &str,
) -> Result<bool, CalendarError>
where
    C: CalendarClient + ?Sized,
    D: DistanceProvider + ?Sized,
{
    let Some(slot_at) = rules.at(date, time) else {
        warn!(%date, %time, "slot does not exist in local time");
        return Ok(false);
    };
    let Some((day_start, day_end)) = rules.day_bounds(date) else {
        return Err(CalendarError::LocalTime(date.to_string()));
    };
    let events = calendar.list_events(day_start, day_end).await?;
    debug!(%date, count = events.len(), "events for adjacency check");

    if is_blocked_out(&events, rules, date) {
        info!(%date, "day rejected: blocked out for the whole working window");
        return Ok(false);
    }

    let stops = booked_stops(&events, rules, date);
    let insert_at = stops.partition_point(|stop| stop.at <= slot_at);
    debug!(
        %date,
        time = %time.format("%H:%M"),
        position = insert_at + 1,
        of = stops.len() + 1,
        "slot position in the day"
    );

    let mut neighbours = Vec::new();
    if insert_at > 0 {
        neighbours.push((Side::Previous, &stops[insert_at - 1]));
    }
    if let Some(next) = stops.get(insert_at) {
        neighbours.push((Side::Next, next));
    }

    for (side, stop) in neighbours {
        let Some(address) = stop.address.as_deref() else {
            debug!(side = side.label(), "neighbour has no address, not measured");
            continue;
        };
        let meters = match distance.distance(candidate_address, address).await {
            Ok(meters) => meters,
            Err(DistanceError::Unavailable(status)) => {
                debug!(side = side.label(), address, %status, "neighbour distance unavailable, not measured");
                continue;
            }
            Err(err) => {
                warn!(%date, time = %time.format("%H:%M"), error = %err, "slot rejected: distance lookup failed");
                return Ok(false);
            }
        };
        let miles = meters_to_miles(meters);
        let gap_hours = (stop.at - slot_at).num_minutes().abs() as f64 / 60.0;
        info!(side = side.label(), address, miles, gap_hours, "neighbour distance");
        if miles > rules.neighbor_radius_miles {
            info!(
                %date,
                time = %time.format("%H:%M"),
                side = side.label(),
                address,
                miles,
                "slot rejected: neighbour too far"
            );
            return Ok(false);
        }
    }

    Ok(true)
}

/// A block-marker event covering the whole working window.
fn is_blocked_out(events: &[CalendarEvent], rules: &SchedulingRules, date: NaiveDate) -> bool {
    let Some((work_start, work_end)) = rules.working_bounds(date) else {
        return false;
    };
    let marker = rules.block_marker.to_lowercase();
    events
        .iter()
        .filter(|event| event.summary.to_lowercase().contains(&marker))
        .any(|event| match event.window_in(&rules.timezone) {
            Ok(Some(window)) => window.covers(work_start, work_end),
            _ => false,
        })
}

fn is_non_booking(event: &CalendarEvent, rules: &SchedulingRules) -> bool {
    let summary = event.summary.to_lowercase();
    summary.contains('@') || summary.starts_with(&rules.availability_marker.to_lowercase())
}

/// Flattens the day's events into time-sorted stops. Slot lists become one
/// address-less stop per listed time.
pub fn booked_stops(events: &[CalendarEvent], rules: &SchedulingRules, date: NaiveDate) -> Vec<BookedStop> {
    let markers = [rules.block_marker.as_str(), rules.availability_marker.as_str()];
    let mut stops = Vec::new();
    for event in events {
        if is_non_booking(event, rules) {
            debug!(summary = %event.summary, "skipping non-booking event");
            continue;
        }
        if let EventShape::SlotList(tokens) = event.shape() {
            for token in tokens {
                match parse_clock_time(&token).and_then(|time| rules.at(date, time)) {
                    Some(at) => stops.push(BookedStop { at, address: None }),
                    None => warn!(summary = %event.summary, token = %token, "skipping unreadable slot-list time"),
                }
            }
            continue;
        }
        match event.start_in(&rules.timezone) {
            Ok(Some(at)) => {
                let address = parse_event_address(event, &markers).map(|found| found.address);
                debug!(at = %at.format("%H:%M"), address = ?address, "booked stop");
                stops.push(BookedStop { at, address });
            }
            Ok(None) => {}
            Err(err) => warn!(summary = %event.summary, error = %err, "error processing event"),
        }
    }
    stops.sort_by_key(|stop| stop.at);
    stops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent {
            summary: summary.to_string(),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..CalendarEvent::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
    }

    #[test]
    fn stops_skip_non_bookings_and_expand_slot_lists() {
        let rules = SchedulingRules::default();
        let events = vec![
            event("13:30 09:00", "2026-10-20T08:00:00+01:00", "2026-10-20T08:30:00+01:00"),
            event("Available all afternoon", "2026-10-20T13:00:00+01:00", "2026-10-20T17:00:00+01:00"),
            event("call bob@example.com", "2026-10-20T11:00:00+01:00", "2026-10-20T11:15:00+01:00"),
            event("Smith Tring", "2026-10-20T12:00:00+01:00", "2026-10-20T13:00:00+01:00"),
        ];
        let stops = booked_stops(&events, &rules, date());
        let times: Vec<String> = stops.iter().map(|s| s.at.format("%H:%M").to_string()).collect();
        assert_eq!(times, vec!["09:00", "12:00", "13:30"]);
        assert_eq!(stops[1].address.as_deref(), Some("Tring"));
        assert!(stops[0].address.is_none());
    }

    #[test]
    fn malformed_events_are_skipped() {
        let rules = SchedulingRules::default();
        let events = vec![
            event("Smith Tring", "not-a-time", "2026-10-20T13:00:00+01:00"),
            event("Jones Chesham", "2026-10-20T15:00:00+01:00", "2026-10-20T16:00:00+01:00"),
        ];
        let stops = booked_stops(&events, &rules, date());
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].address.as_deref(), Some("Chesham"));
    }

    #[test]
    fn block_marker_must_cover_working_window() {
        let rules = SchedulingRules::default();
        let whole = vec![event("NO CLIVE", "2026-10-20T08:00:00+01:00", "2026-10-20T18:00:00+01:00")];
        let morning = vec![event("NO CLIVE", "2026-10-20T09:00:00+01:00", "2026-10-20T12:00:00+01:00")];
        assert!(is_blocked_out(&whole, &rules, date()));
        assert!(!is_blocked_out(&morning, &rules, date()));
    }
}
