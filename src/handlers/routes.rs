use std::convert::Infallible;

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use warp::Filter;

use crate::handlers::api::{self, ApiResponse, AppState, BookingVariant};

fn into_reply(response: ApiResponse) -> impl warp::Reply {
    warp::reply::with_status(warp::reply::json(&response.body), response.status)
}

fn today(state: &AppState) -> NaiveDate {
    Utc::now().with_timezone(&state.rules.timezone).date_naive()
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_post(
    name: &'static str,
) -> impl Filter<Extract = (Option<String>, Bytes), Error = warp::Rejection> + Clone {
    warp::post()
        .and(warp::path(name))
        .and(warp::path::end())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
}

async fn check_availability(
    content_type: Option<String>,
    body: Bytes,
    state: AppState,
) -> Result<impl warp::Reply, Infallible> {
    let response = api::check_availability(&state, content_type.as_deref(), &body, today(&state)).await;
    Ok(into_reply(response))
}

async fn create_booking(
    variant: BookingVariant,
    content_type: Option<String>,
    body: Bytes,
    state: AppState,
) -> Result<impl warp::Reply, Infallible> {
    let response =
        api::create_booking(&state, variant, content_type.as_deref(), &body, today(&state)).await;
    Ok(into_reply(response))
}

/// All endpoints with CORS and request logging applied.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let availability = json_post("check-availability")
        .and(with_state(state.clone()))
        .and_then(check_availability);
    let booking = json_post("create-booking")
        .and(with_state(state.clone()))
        .and_then(|content_type: Option<String>, body: Bytes, state: AppState| {
            create_booking(BookingVariant::Standard, content_type, body, state)
        });
    let direct = json_post("direct-booking")
        .and(with_state(state))
        .and_then(|content_type: Option<String>, body: Bytes, state: AppState| {
            create_booking(BookingVariant::Direct, content_type, body, state)
        });

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);
    let log = warp::log::custom(|info| {
        tracing::info!(
            method = %info.method(),
            path = info.path(),
            status = info.status().as_u16(),
            elapsed_ms = info.elapsed().as_millis() as u64,
            "handled request"
        );
    });

    availability.or(booking).or(direct).with(cors).with(log)
}
