use std::cmp::max;

use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use crate::clients::{CalendarClient, DistanceProvider};
use crate::error::SearchError;
use crate::models::rules::{SchedulingRules, meters_to_miles};
use crate::models::slot::{Slot, TIME_FORMAT};
use crate::service::adjacency_filter::is_geographically_compatible;
use crate::service::day_filter::is_day_open;
use crate::service::slot_filter::is_slot_free_at;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub slots: Vec<Slot>,
    pub message: String,
}

/// First and last date of the search horizon. The horizon always ends
/// `search_days` after today; a resume cursor only moves the start.
pub fn search_window(
    rules: &SchedulingRules,
    today: NaiveDate,
    last_offered: Option<NaiveDate>,
) -> (NaiveDate, NaiveDate) {
    let end = today
        .checked_add_days(Days::new(rules.search_days.max(0) as u64))
        .unwrap_or(today);
    let start = match last_offered.and_then(|d| d.succ_opt()) {
        Some(after) => max(today, after),
        None => today,
    };
    (start, end)
}

/// Finds every offerable slot for a caller address.
pub async fn find_available_slots<C, D>(
    calendar: &C,
    distance: &D,
    rules: &SchedulingRules,
    shop_address: &str,
    caller_address: &str,
    today: NaiveDate,
    last_offered: Option<NaiveDate>,
) -> Result<SearchOutcome, SearchError>
where
    C: CalendarClient + ?Sized,
    D: DistanceProvider + ?Sized,
{
    let meters = match distance.distance(caller_address, shop_address).await {
        Ok(meters) => meters,
        Err(err) => {
            warn!(error = %err, "could not verify distance from shop");
            return Err(SearchError::DistanceUnavailable);
        }
    };
    let miles = meters_to_miles(meters);
    info!(miles, "distance from shop");
    if miles > rules.shop_radius_miles {
        return Err(SearchError::TooFar { miles });
    }

    let (start, end) = search_window(rules, today, last_offered);
    let mut candidates = Vec::new();
    for date in start.iter_days().take_while(|d| *d <= end) {
        if !rules.template.offers(date) {
            continue;
        }
        if !is_day_open(calendar, rules, date).await? {
            info!(%date, "day has a full-day commitment, skipping all slots");
            continue;
        }
        for &time in rules.template.times_for(date) {
            if is_slot_free_at(calendar, rules, date.and_time(time)).await? {
                candidates.push(Slot::new(date, time));
            }
        }
    }
    info!(count = candidates.len(), "calendar-free slots found");

    let mut accepted = Vec::new();
    for slot in candidates {
        if is_geographically_compatible(calendar, distance, rules, slot.date, slot.time, caller_address).await? {
            info!(date = %slot.date, time = %slot.time.format(TIME_FORMAT), "slot accepted");
            accepted.push(slot);
        } else {
            info!(date = %slot.date, time = %slot.time.format(TIME_FORMAT), "slot rejected");
        }
    }

    if accepted.is_empty() {
        return Err(SearchError::NoSuitableSlots);
    }
    let message = availability_message(&accepted);
    Ok(SearchOutcome {
        slots: accepted,
        message,
    })
}

/// Lists the slots grouped by date, in the order given.
pub fn availability_message(slots: &[Slot]) -> String {
    let mut groups: Vec<(NaiveDate, Vec<String>)> = Vec::new();
    for slot in slots {
        let time = slot.time.format(TIME_FORMAT).to_string();
        match groups.iter_mut().find(|(date, _)| *date == slot.date) {
            Some((_, times)) => times.push(time),
            None => groups.push((slot.date, vec![time])),
        }
    }

    let mut message = String::from("We have available piano tuning slots on the following dates:\n");
    for (date, times) in groups {
        message.push_str(&format!("- {} at {}\n", date.format("%A, %B %d"), times.join(", ")));
    }
    message.push_str(
        "\nPlease let me know which slot you'd prefer, and I'll book it for you. \
         I'll need your name, address, and phone number to complete the booking.",
    );
    message
}
