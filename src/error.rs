use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("calendar API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("invalid calendar URL: {0}")]
    Url(String),
    #[error("calendar response missing {0}")]
    MissingField(&'static str),
    #[error("could not build a local time for {0}")]
    LocalTime(String),
}

#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("distance request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("distance lookup unavailable: {0}")]
    Unavailable(String),
    #[error("distance response malformed: {0}")]
    Malformed(String),
}

/// Failures of an availability search, in the order the search can hit them.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Could not verify distance")]
    DistanceUnavailable,
    #[error("Location too far ({miles:.1} miles)")]
    TooFar { miles: f64 },
    #[error("No suitable slots found")]
    NoSuitableSlots,
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Selected time slot is no longer available")]
    SlotUnavailable,
    #[error("Could not verify distance")]
    DistanceUnavailable,
    #[error("Failed to create booking")]
    CreateFailed(#[source] CalendarError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}
