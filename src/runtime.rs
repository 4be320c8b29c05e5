use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::clients::{DistanceMatrixClient, GoogleCalendarClient};
use crate::config::Settings;
use crate::handlers::api::AppState;
use crate::handlers::routes::routes;

pub fn build_state(settings: &Settings) -> AppState {
    let calendar = GoogleCalendarClient::new(
        settings.calendar_id.clone(),
        settings.calendar_access_token.clone(),
    )
    .with_base_url(settings.calendar_api_base.clone());
    let distance = DistanceMatrixClient::new(settings.distance_api_key.clone())
        .with_base_url(settings.distance_api_base.clone());

    AppState {
        calendar: Arc::new(calendar),
        distance: Arc::new(distance),
        rules: Arc::new(settings.rules.clone()),
        shop_address: Arc::new(settings.shop_address.clone()),
    }
}

pub async fn run_api(settings: Settings) {
    let state = build_state(&settings);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(%addr, calendar = %settings.calendar_id, "booking API listening");
    warp::serve(routes(state)).run(addr).await;
}
