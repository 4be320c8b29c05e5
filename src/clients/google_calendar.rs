use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalendarError;
use crate::models::event::{CalendarEvent, NewEvent};

pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "250";

/// Read/write access to the single shared booking calendar.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Events overlapping `[time_min, time_max)`, ordered by start.
    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Creates the event and returns its id.
    async fn insert_event(&self, event: &NewEvent) -> Result<String, CalendarError>;
}

pub struct GoogleCalendarClient {
    http: Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(calendar_id: String, access_token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: GOOGLE_CALENDAR_API_BASE.to_string(),
            calendar_id,
            access_token,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(&self) -> Result<Url, CalendarError> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| CalendarError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| CalendarError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    #[serde(default)]
    start: GoogleEventTime,
    #[serde(default)]
    end: GoogleEventTime,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Serialize)]
struct InsertEventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: Option<String>,
}

impl From<GoogleEvent> for CalendarEvent {
    fn from(event: GoogleEvent) -> Self {
        CalendarEvent {
            id: event.id,
            summary: event.summary.unwrap_or_default(),
            description: event.description,
            location: event.location,
            start: event.start.date_time,
            end: event.end.date_time,
        }
    }
}

fn rfc3339(at: &DateTime<Tz>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CalendarError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let url = self.events_url()?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, String)> = vec![
                ("timeMin", rfc3339(&time_min)),
                ("timeMax", rfc3339(&time_max)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .http
                .get(url.clone())
                .bearer_auth(&self.access_token)
                .query(&query)
                .send()
                .await?;
            let page: EventsPage = check_status(response).await?.json().await?;
            events.extend(page.items.into_iter().map(CalendarEvent::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        debug!(
            count = events.len(),
            time_min = %rfc3339(&time_min),
            time_max = %rfc3339(&time_max),
            "listed calendar events"
        );
        Ok(events)
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<String, CalendarError> {
        let body = InsertEventBody {
            summary: &event.summary,
            description: &event.description,
            start: GoogleEventTime {
                date_time: Some(rfc3339(&event.start)),
                time_zone: Some(event.time_zone.clone()),
            },
            end: GoogleEventTime {
                date_time: Some(rfc3339(&event.end)),
                time_zone: Some(event.time_zone.clone()),
            },
        };
        let response = self
            .http
            .post(self.events_url()?)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let created: InsertedEvent = check_status(response).await?.json().await?;
        created.id.ok_or(CalendarError::MissingField("id"))
    }
}
