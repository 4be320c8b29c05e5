#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use tuningScheduler::clients::{CalendarClient, DistanceProvider};
use tuningScheduler::error::{CalendarError, DistanceError};
use tuningScheduler::handlers::api::AppState;
use tuningScheduler::models::event::{CalendarEvent, NewEvent};
use tuningScheduler::models::rules::{METERS_PER_MILE, SchedulingRules};

pub const SHOP: &str = "53 High Street, Northchurch, HP4 3QH";

/// Sunday 2026-10-18.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn miles(m: f64) -> u64 {
    (m * METERS_PER_MILE).round() as u64
}

pub fn event(summary: &str, start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        summary: summary.to_string(),
        start: Some(start.to_string()),
        end: Some(end.to_string()),
        ..CalendarEvent::default()
    }
}

/// In-memory calendar that answers range queries like the real one.
#[derive(Default)]
pub struct FakeCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    pub inserted: Mutex<Vec<NewEvent>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn rejecting_writes(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn inserted(&self) -> Vec<NewEvent> {
        self.inserted.lock().unwrap().clone()
    }
}

fn overlaps(event: &CalendarEvent, min: &DateTime<Tz>, max: &DateTime<Tz>) -> bool {
    let (Some(start), Some(end)) = (&event.start, &event.end) else {
        return false;
    };
    match (
        DateTime::parse_from_rfc3339(start),
        DateTime::parse_from_rfc3339(end),
    ) {
        (Ok(start), Ok(end)) => end > *min && start < *max,
        // Unreadable events still come back from the calendar.
        _ => true,
    }
}

#[async_trait::async_trait]
impl CalendarClient for FakeCalendar {
    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if self.fail_reads {
            return Err(CalendarError::Api {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        let mut found: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| overlaps(e, &time_min, &time_max))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(found)
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<String, CalendarError> {
        if self.fail_writes {
            return Err(CalendarError::Api {
                status: 403,
                body: "insufficient permissions".to_string(),
            });
        }
        self.inserted.lock().unwrap().push(event.clone());
        let mut events = self.events.lock().unwrap();
        let id = format!("evt{}", events.len());
        events.push(CalendarEvent {
            id: Some(id.clone()),
            summary: event.summary.clone(),
            description: Some(event.description.clone()),
            location: None,
            start: Some(event.start.to_rfc3339()),
            end: Some(event.end.to_rfc3339()),
        });
        Ok(id)
    }
}

/// Distances keyed by destination address; anything unknown gets `default`.
pub struct FakeDistance {
    pub default: Option<u64>,
    pub by_destination: HashMap<String, Option<u64>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeDistance {
    pub fn everywhere(meters: u64) -> Self {
        Self {
            default: Some(meters),
            by_destination: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, destination: &str, meters: u64) -> Self {
        self.by_destination.insert(destination.to_string(), Some(meters));
        self
    }

    pub fn unresolvable(mut self, destination: &str) -> Self {
        self.by_destination.insert(destination.to_string(), None);
        self
    }

    pub fn calls_to(&self, destination: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, d)| d == destination)
            .count()
    }
}

#[async_trait::async_trait]
impl DistanceProvider for FakeDistance {
    async fn distance(&self, origin: &str, destination: &str) -> Result<u64, DistanceError> {
        self.calls
            .lock()
            .unwrap()
            .push((origin.to_string(), destination.to_string()));
        let meters = match self.by_destination.get(destination) {
            Some(entry) => *entry,
            None => self.default,
        };
        meters.ok_or_else(|| DistanceError::Unavailable("NOT_FOUND".to_string()))
    }
}

pub fn state(calendar: Arc<FakeCalendar>, distance: Arc<FakeDistance>) -> AppState {
    AppState {
        calendar,
        distance,
        rules: Arc::new(SchedulingRules::default()),
        shop_address: Arc::new(SHOP.to_string()),
    }
}
