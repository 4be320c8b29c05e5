use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A one-hour candidate appointment window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Slot {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_clock_time")]
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

fn serialize_clock_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

pub fn parse_clock_time(token: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(token.trim(), TIME_FORMAT).ok()
}
