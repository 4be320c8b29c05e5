use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::service::slot_template::SlotTemplate;

pub const METERS_PER_MILE: f64 = 1609.34;

/// Fixed business rules the filters and the committer work from.
#[derive(Debug, Clone)]
pub struct SchedulingRules {
    pub timezone: Tz,
    pub template: SlotTemplate,
    pub working_start: NaiveTime,
    pub working_end: NaiveTime,
    pub slot_length: Duration,
    /// Events at least this long close the whole day.
    pub full_day_hours: f64,
    pub block_marker: String,
    pub availability_marker: String,
    pub neighbor_radius_miles: f64,
    pub shop_radius_miles: f64,
    pub search_days: i64,
    pub contact_line: String,
    pub tuning_price: String,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::London,
            template: SlotTemplate::default(),
            working_start: NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time"),
            working_end: NaiveTime::from_hms_opt(17, 0, 0).expect("17:00 is a valid time"),
            slot_length: Duration::hours(1),
            full_day_hours: 7.0,
            block_marker: "no clive".to_string(),
            availability_marker: "available".to_string(),
            neighbor_radius_miles: 10.0,
            shop_radius_miles: 20.0,
            search_days: 28,
            contact_line: "Lee on 01442 876131".to_string(),
            tuning_price: "£85".to_string(),
        }
    }
}

impl SchedulingRules {
    /// Resolves a wall-clock time in the business timezone. Times skipped by
    /// a DST change have no local instant.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<chrono::DateTime<Tz>> {
        self.timezone.from_local_datetime(&naive).earliest()
    }

    pub fn at(&self, date: NaiveDate, time: NaiveTime) -> Option<chrono::DateTime<Tz>> {
        self.localize(date.and_time(time))
    }

    pub fn day_bounds(&self, date: NaiveDate) -> Option<(chrono::DateTime<Tz>, chrono::DateTime<Tz>)> {
        let start = self.at(date, NaiveTime::MIN)?;
        let end = self.at(date.succ_opt()?, NaiveTime::MIN)?;
        Some((start, end))
    }

    pub fn working_bounds(&self, date: NaiveDate) -> Option<(chrono::DateTime<Tz>, chrono::DateTime<Tz>)> {
        Some((self.at(date, self.working_start)?, self.at(date, self.working_end)?))
    }
}

pub fn meters_to_miles(meters: u64) -> f64 {
    meters as f64 / METERS_PER_MILE
}
