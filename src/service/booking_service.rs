use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::clients::{CalendarClient, DistanceProvider};
use crate::error::BookingError;
use crate::models::booking::{BookingConfirmation, BookingRequest};
use crate::models::event::NewEvent;
use crate::models::rules::SchedulingRules;
use crate::service::datetime::parse_slot_datetime;
use crate::service::slot_filter::is_slot_free_at;

pub struct BookingService;

impl BookingService {
    /// Re-validates the slot and writes the appointment to the calendar.
    ///
    /// The shop distance is resolved for the confirmation only; the search
    /// radius is not enforced again here.
    pub async fn commit<C, D>(
        calendar: &C,
        distance: &D,
        rules: &SchedulingRules,
        shop_address: &str,
        request: BookingRequest,
        today: NaiveDate,
    ) -> Result<BookingConfirmation, BookingError>
    where
        C: CalendarClient + ?Sized,
        D: DistanceProvider + ?Sized,
    {
        info!(
            customer = %request.customer_name,
            date = %request.date,
            time = %request.time,
            "attempting to create booking"
        );
        let Some(start) = parse_slot_datetime(&request.date, &request.time, today) else {
            warn!(date = %request.date, time = %request.time, "could not parse booking date/time");
            return Err(BookingError::SlotUnavailable);
        };
        if !is_slot_free_at(calendar, rules, start).await? {
            return Err(BookingError::SlotUnavailable);
        }

        let meters = distance
            .distance(&request.address, shop_address)
            .await
            .map_err(|err| {
                warn!(address = %request.address, error = %err, "could not verify distance");
                BookingError::DistanceUnavailable
            })?;

        let Some(local_start) = rules.localize(start) else {
            return Err(BookingError::SlotUnavailable);
        };
        let event = NewEvent {
            summary: request.event_summary(),
            description: request.event_description(),
            start: local_start,
            end: local_start + rules.slot_length,
            time_zone: rules.timezone.name().to_string(),
        };
        let event_id = calendar.insert_event(&event).await.map_err(|err| {
            error!(error = %err, "error creating booking");
            BookingError::CreateFailed(err)
        })?;
        info!(%event_id, summary = %event.summary, "created booking event");

        Ok(request.confirm(meters))
    }
}
