mod support;

use std::sync::Arc;

use serde_json::{Value, json};
use tuningScheduler::handlers::api::{self, AppState, ApiResponse, BookingVariant};
use warp::http::StatusCode;

use support::{FakeCalendar, FakeDistance, SHOP, event, miles, state, today};

const ADDRESS: &str = "1 High Street, Berkhamsted, HP4 1AA";

fn booking(date: &str, time: &str) -> Value {
    json!({
        "date": date,
        "time": time,
        "customer_name": "Jane Doe",
        "address": ADDRESS,
        "phone": "01442 000000",
    })
}

async fn book(state: &AppState, variant: BookingVariant, body: &Value) -> ApiResponse {
    api::create_booking(
        state,
        variant,
        Some("application/json"),
        body.to_string().as_bytes(),
        today(),
    )
    .await
}

#[tokio::test]
async fn free_slot_is_written_to_the_calendar() {
    let calendar = Arc::new(FakeCalendar::default());
    let distance = Arc::new(FakeDistance::everywhere(miles(5.0)));
    let state = state(calendar.clone(), distance.clone());

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-20", "10:30")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "Great! Your piano tuning appointment is all set for 2026-10-20 at 10:30 with our piano tuner. \
         He'll be visiting you at 1 High Street, Berkhamsted, HP4 1AA."
    );
    let details = &response.body["booking_details"];
    assert_eq!(details["customer_name"], "Jane Doe");
    assert_eq!(details["phone"], "01442 000000");
    assert_eq!(details["distance"], miles(5.0));

    let inserted = calendar.inserted();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].summary, "Jane Doe Berkhamsted");
    assert_eq!(
        inserted[0].description,
        "Customer: Jane Doe\nAddress: 1 High Street, Berkhamsted, HP4 1AA\nPhone: 01442 000000"
    );
    assert_eq!(inserted[0].start.to_rfc3339(), "2026-10-20T10:30:00+01:00");
    assert_eq!(inserted[0].end.to_rfc3339(), "2026-10-20T11:30:00+01:00");
    assert_eq!(inserted[0].time_zone, "Europe/London");

    // Distance is measured from the customer to the shop.
    assert_eq!(distance.calls_to(SHOP), 1);
}

#[tokio::test]
async fn occupied_slot_is_refused() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![event(
        "Smith Tring",
        "2026-10-20T10:00:00+01:00",
        "2026-10-20T11:00:00+01:00",
    )]));
    let state = state(calendar.clone(), Arc::new(FakeDistance::everywhere(miles(5.0))));

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-20", "10:30")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Selected time slot is no longer available");
    assert!(calendar.inserted().is_empty());
}

#[tokio::test]
async fn slot_listed_in_a_slot_list_is_refused() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![event(
        "10:30 12:00",
        "2026-10-21T08:00:00+01:00",
        "2026-10-21T08:15:00+01:00",
    )]));
    let state = state(calendar.clone(), Arc::new(FakeDistance::everywhere(miles(5.0))));

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-21", "12:00")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-21", "13:30")).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn second_booking_of_the_same_slot_is_refused() {
    let calendar = Arc::new(FakeCalendar::default());
    let state = state(calendar.clone(), Arc::new(FakeDistance::everywhere(miles(5.0))));
    let body = booking("2026-10-22", "12:00");

    assert_eq!(book(&state, BookingVariant::Standard, &body).await.status, StatusCode::OK);
    let second = book(&state, BookingVariant::Standard, &body).await;

    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(calendar.inserted().len(), 1);
}

#[tokio::test]
async fn direct_booking_quotes_the_price() {
    let state = state(
        Arc::new(FakeCalendar::default()),
        Arc::new(FakeDistance::everywhere(miles(5.0))),
    );

    let response = book(&state, BookingVariant::Direct, &booking("2026-10-20", "10:30")).await;

    assert_eq!(response.status, StatusCode::OK);
    let message = response.body["message"].as_str().unwrap();
    assert!(message.starts_with("Your piano tuning appointment is all set for 2026-10-20 at 10:30"));
    assert!(message.ends_with("and the cost is £85."));
}

#[tokio::test]
async fn human_readable_dates_are_accepted() {
    let calendar = Arc::new(FakeCalendar::default());
    let state = state(calendar.clone(), Arc::new(FakeDistance::everywhere(miles(5.0))));

    let response = book(&state, BookingVariant::Standard, &booking("Tuesday, October 27", "12:00")).await;
    assert_eq!(response.status, StatusCode::OK);
    // Echoed back as given.
    assert_eq!(response.body["booking_details"]["date"], "Tuesday, October 27");
    // After the clocks go back the wall time is GMT.
    assert_eq!(calendar.inserted()[0].start.to_rfc3339(), "2026-10-27T12:00:00+00:00");

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-28", "01:30 PM")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(calendar.inserted()[1].start.to_rfc3339(), "2026-10-28T13:30:00+00:00");
}

#[tokio::test]
async fn unparseable_date_is_treated_as_unavailable() {
    let calendar = Arc::new(FakeCalendar::default());
    let state = state(calendar.clone(), Arc::new(FakeDistance::everywhere(miles(5.0))));

    let response = book(&state, BookingVariant::Standard, &booking("next Tuesday", "10:30")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Selected time slot is no longer available");
    assert!(calendar.inserted().is_empty());
}

#[tokio::test]
async fn unknown_customer_address_is_refused() {
    let calendar = Arc::new(FakeCalendar::default());
    let distance = FakeDistance::everywhere(miles(5.0)).unresolvable(SHOP);
    let state = state(calendar.clone(), Arc::new(distance));

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-20", "10:30")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Could not verify distance");
    assert!(calendar.inserted().is_empty());
}

#[tokio::test]
async fn booking_beyond_the_search_radius_still_commits() {
    let state = state(
        Arc::new(FakeCalendar::default()),
        Arc::new(FakeDistance::everywhere(miles(30.0))),
    );

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-20", "10:30")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["booking_details"]["distance"], miles(30.0));
}

#[tokio::test]
async fn calendar_write_failure_is_a_server_error() {
    let state = state(
        Arc::new(FakeCalendar::rejecting_writes(Vec::new())),
        Arc::new(FakeDistance::everywhere(miles(5.0))),
    );

    let response = book(&state, BookingVariant::Standard, &booking("2026-10-20", "10:30")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Failed to create booking");
}

#[tokio::test]
async fn calendar_read_failure_is_a_server_error() {
    let state = state(
        Arc::new(FakeCalendar::failing()),
        Arc::new(FakeDistance::everywhere(miles(5.0))),
    );

    let response = book(&state, BookingVariant::Direct, &booking("2026-10-20", "10:30")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to create booking: "));
    assert!(error.contains("503"));
}

#[tokio::test]
async fn missing_fields_are_listed() {
    let calendar = Arc::new(FakeCalendar::default());
    let state = state(calendar.clone(), Arc::new(FakeDistance::everywhere(miles(5.0))));

    let response = book(
        &state,
        BookingVariant::Standard,
        &json!({"date": "2026-10-20", "time": "10:30", "customer_name": ""}),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Missing required fields");
    assert_eq!(response.body["missing_fields"], json!(["customer_name", "address", "phone"]));
    assert!(calendar.inserted().is_empty());
}

#[tokio::test]
async fn body_must_be_json() {
    let state = state(
        Arc::new(FakeCalendar::default()),
        Arc::new(FakeDistance::everywhere(miles(5.0))),
    );

    let response = api::create_booking(
        &state,
        BookingVariant::Standard,
        Some("application/x-www-form-urlencoded"),
        b"date=2026-10-20",
        today(),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Content-Type must be application/json");

    let response = api::create_booking(&state, BookingVariant::Direct, None, b"{}", today()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
