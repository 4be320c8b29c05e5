use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

/// Candidate appointment start times per weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotTemplate {
    times: HashMap<Weekday, Vec<NaiveTime>>,
}

impl SlotTemplate {
    pub fn new(times: HashMap<Weekday, Vec<NaiveTime>>) -> Self {
        let mut times = times;
        for list in times.values_mut() {
            list.sort();
            list.dedup();
        }
        Self { times }
    }

    pub fn times_for_weekday(&self, weekday: Weekday) -> &[NaiveTime] {
        self.times.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn times_for(&self, date: NaiveDate) -> &[NaiveTime] {
        self.times_for_weekday(date.weekday())
    }

    pub fn offers(&self, date: NaiveDate) -> bool {
        !self.times_for(date).is_empty()
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("template times are valid clock times")
}

impl Default for SlotTemplate {
    /// The tuner's week: Tuesday to Thursday only.
    fn default() -> Self {
        let mut times = HashMap::new();
        times.insert(
            Weekday::Tue,
            vec![hm(10, 30), hm(12, 0), hm(13, 30), hm(15, 0), hm(16, 0)],
        );
        times.insert(
            Weekday::Wed,
            vec![hm(9, 0), hm(10, 30), hm(12, 0), hm(13, 30), hm(15, 0), hm(16, 0)],
        );
        times.insert(
            Weekday::Thu,
            vec![hm(10, 30), hm(12, 0), hm(13, 30), hm(15, 0)],
        );
        Self::new(times)
    }
}
