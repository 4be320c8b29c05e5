use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::slot::parse_clock_time;

/// A calendar event as read back from the calendar. Start and end keep the
/// raw RFC 3339 strings; all-day events have neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventShape {
    /// Title made only of clock-time tokens, each marking an occupied slot.
    SlotList(Vec<String>),
    Ordinary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl EventWindow {
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    pub fn covers(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
        self.start <= start && self.end >= end
    }
}

impl CalendarEvent {
    pub fn shape(&self) -> EventShape {
        let tokens: Vec<&str> = self.summary.split_whitespace().collect();
        if tokens.is_empty() {
            return EventShape::Ordinary;
        }
        if tokens.iter().all(|token| is_time_token(token)) {
            EventShape::SlotList(tokens.into_iter().map(str::to_string).collect())
        } else {
            EventShape::Ordinary
        }
    }

    pub fn is_slot_list(&self) -> bool {
        matches!(self.shape(), EventShape::SlotList(_))
    }

    /// Parsed times of a slot-list title. Tokens that are not `HH:MM` are dropped.
    pub fn listed_times(&self) -> Vec<NaiveTime> {
        match self.shape() {
            EventShape::SlotList(tokens) => tokens.iter().filter_map(|t| parse_clock_time(t)).collect(),
            EventShape::Ordinary => Vec::new(),
        }
    }

    pub fn lists_time(&self, time: NaiveTime) -> bool {
        self.listed_times().contains(&time)
    }

    /// The event's start in `tz`, `Ok(None)` when it has no timed start.
    pub fn start_in(&self, tz: &Tz) -> Result<Option<DateTime<Tz>>, chrono::ParseError> {
        parse_event_time(self.start.as_deref(), tz)
    }

    /// Start/end in `tz`. `Ok(None)` for events without both timed bounds;
    /// `Err` when a bound is present but malformed.
    pub fn window_in(&self, tz: &Tz) -> Result<Option<EventWindow>, chrono::ParseError> {
        let start = parse_event_time(self.start.as_deref(), tz)?;
        let end = parse_event_time(self.end.as_deref(), tz)?;
        Ok(match (start, end) {
            (Some(start), Some(end)) => Some(EventWindow { start, end }),
            _ => None,
        })
    }
}

fn is_time_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit()) && token.chars().all(|c| c.is_ascii_digit() || c == ':')
}

fn parse_event_time(raw: Option<&str>, tz: &Tz) -> Result<Option<DateTime<Tz>>, chrono::ParseError> {
    match raw {
        Some(value) => Ok(Some(DateTime::parse_from_rfc3339(value)?.with_timezone(tz))),
        None => Ok(None),
    }
}

/// An event the committer asks the calendar to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub time_zone: String,
}
