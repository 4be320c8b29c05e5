use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::DistanceError;

pub const DISTANCE_MATRIX_API_BASE: &str = "https://maps.googleapis.com";
const DISTANCE_MATRIX_PATH: &str = "/maps/api/distancematrix/json";

/// Point-to-point road distance between two free-text addresses.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Distance in meters.
    async fn distance(&self, origin: &str, destination: &str) -> Result<u64, DistanceError>;
}

pub struct DistanceMatrixClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl DistanceMatrixClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: DISTANCE_MATRIX_API_BASE.to_string(),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: u64,
}

fn first_distance(response: MatrixResponse) -> Result<u64, DistanceError> {
    if response.status != "OK" {
        return Err(DistanceError::Unavailable(response.status));
    }
    let element = response
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| DistanceError::Malformed("no elements in response".to_string()))?;
    if element.status != "OK" {
        return Err(DistanceError::Unavailable(element.status));
    }
    element
        .distance
        .map(|d| d.value)
        .ok_or_else(|| DistanceError::Malformed("element without distance".to_string()))
}

#[async_trait]
impl DistanceProvider for DistanceMatrixClient {
    async fn distance(&self, origin: &str, destination: &str) -> Result<u64, DistanceError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), DISTANCE_MATRIX_PATH);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DistanceError::Unavailable(format!("HTTP {}", status)));
        }
        let body = response.text().await?;
        let parsed: MatrixResponse =
            serde_json::from_str(&body).map_err(|e| DistanceError::Malformed(e.to_string()))?;
        first_distance(parsed)
    }
}
