use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{Instrument, error, info_span, warn};
use uuid::Uuid;
use warp::http::StatusCode;

use crate::clients::{CalendarClient, DistanceProvider};
use crate::error::{BookingError, SearchError};
use crate::models::booking::{BookingRequest, REQUIRED_FIELDS};
use crate::models::rules::SchedulingRules;
use crate::models::slot::DATE_FORMAT;
use crate::service::booking_service::BookingService;
use crate::service::slot_search::find_available_slots;

/// Everything a request needs: the two upstreams and the business rules.
#[derive(Clone)]
pub struct AppState {
    pub calendar: Arc<dyn CalendarClient>,
    pub distance: Arc<dyn DistanceProvider>,
    pub rules: Arc<SchedulingRules>,
    pub shop_address: Arc<String>,
}

/// A JSON body with its status, before it is turned into a warp reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn bad_request(body: Value) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingVariant {
    /// `/create-booking`
    Standard,
    /// `/direct-booking`, confirmation quotes the price.
    Direct,
}

#[derive(Debug, Deserialize)]
struct AvailabilityBody {
    postcode: Option<String>,
    /// Resume cursor; anything but a `YYYY-MM-DD` string is ignored.
    last_offered_date: Option<Value>,
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn decode_json(content_type: Option<&str>, body: &[u8]) -> Result<Value, ApiResponse> {
    if !is_json(content_type) {
        return Err(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "Content-Type must be application/json",
        ));
    }
    serde_json::from_slice(body)
        .map_err(|_| ApiResponse::error(StatusCode::BAD_REQUEST, "Request body must be valid JSON"))
}

pub async fn check_availability(
    state: &AppState,
    content_type: Option<&str>,
    body: &[u8],
    today: NaiveDate,
) -> ApiResponse {
    let span = info_span!("check_availability", request_id = %Uuid::new_v4());
    check_availability_inner(state, content_type, body, today)
        .instrument(span)
        .await
}

async fn check_availability_inner(
    state: &AppState,
    content_type: Option<&str>,
    body: &[u8],
    today: NaiveDate,
) -> ApiResponse {
    let value = match decode_json(content_type, body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let request: AvailabilityBody = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(_) => return ApiResponse::error(StatusCode::BAD_REQUEST, "Postcode is required"),
    };
    let Some(postcode) = request.postcode.filter(|p| !p.trim().is_empty()) else {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "Postcode is required");
    };
    let last_offered = request.last_offered_date.as_ref().and_then(|raw| {
        raw.as_str()
            .and_then(|text| NaiveDate::parse_from_str(text, DATE_FORMAT).ok())
            .or_else(|| {
                warn!(last_offered_date = %raw, "ignoring unparseable last_offered_date");
                None
            })
    });

    let rules = state.rules.as_ref();
    let outcome = find_available_slots(
        state.calendar.as_ref(),
        state.distance.as_ref(),
        rules,
        &state.shop_address,
        &postcode,
        today,
        last_offered,
    )
    .await;

    match outcome {
        Ok(outcome) => ApiResponse::ok(json!({
            "available_slots": outcome.slots,
            "total_slots": outcome.slots.len(),
            "message": outcome.message,
        })),
        Err(SearchError::DistanceUnavailable) => {
            ApiResponse::error(StatusCode::BAD_REQUEST, "Could not verify distance")
        }
        Err(SearchError::TooFar { .. }) => ApiResponse::bad_request(json!({
            "error": "Location too far",
            "message": format!(
                "Your location is more than {} miles from our shop. Please call {} to discuss your booking.",
                rules.shop_radius_miles, rules.contact_line
            ),
        })),
        Err(SearchError::NoSuitableSlots) => ApiResponse::bad_request(json!({
            "error": "No suitable slots found",
            "message": format!(
                "No suitable tuning slots found within {} miles of adjacent bookings. Please call {} to discuss your booking.",
                rules.neighbor_radius_miles, rules.contact_line
            ),
        })),
        Err(SearchError::Calendar(err)) => {
            error!(error = %err, "error in check_availability");
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to check availability")
        }
    }
}

/// Pulls the required booking fields; absent, non-string or blank values
/// are reported as missing.
fn booking_request(value: &Value) -> Result<BookingRequest, ApiResponse> {
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| field(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ApiResponse::bad_request(json!({
            "error": "Missing required fields",
            "missing_fields": missing,
        })));
    }
    Ok(BookingRequest {
        date: field("date").unwrap_or_default(),
        time: field("time").unwrap_or_default(),
        customer_name: field("customer_name").unwrap_or_default(),
        address: field("address").unwrap_or_default(),
        phone: field("phone").unwrap_or_default(),
    })
}

pub async fn create_booking(
    state: &AppState,
    variant: BookingVariant,
    content_type: Option<&str>,
    body: &[u8],
    today: NaiveDate,
) -> ApiResponse {
    let span = info_span!("create_booking", request_id = %Uuid::new_v4(), ?variant);
    create_booking_inner(state, variant, content_type, body, today)
        .instrument(span)
        .await
}

async fn create_booking_inner(
    state: &AppState,
    variant: BookingVariant,
    content_type: Option<&str>,
    body: &[u8],
    today: NaiveDate,
) -> ApiResponse {
    let value = match decode_json(content_type, body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let request = match booking_request(&value) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let rules = state.rules.as_ref();
    let result = BookingService::commit(
        state.calendar.as_ref(),
        state.distance.as_ref(),
        rules,
        &state.shop_address,
        request,
        today,
    )
    .await;

    match result {
        Ok(booking) => {
            let message = match variant {
                BookingVariant::Standard => format!(
                    "Great! Your piano tuning appointment is all set for {} at {} with our piano tuner. He'll be visiting you at {}.",
                    booking.date, booking.time, booking.address
                ),
                BookingVariant::Direct => format!(
                    "Your piano tuning appointment is all set for {} at {} with our piano tuner. He'll be visiting you at {}, and the cost is {}.",
                    booking.date, booking.time, booking.address, rules.tuning_price
                ),
            };
            ApiResponse::ok(json!({
                "message": message,
                "booking_details": booking,
            }))
        }
        Err(err @ (BookingError::SlotUnavailable | BookingError::DistanceUnavailable)) => {
            ApiResponse::error(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(BookingError::CreateFailed(err)) => {
            error!(error = %err, "failed to create booking");
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create booking")
        }
        Err(BookingError::Calendar(err)) => {
            error!(error = %err, "calendar unavailable while booking");
            ApiResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create booking: {}", err),
            )
        }
    }
}
