use crate::http::{send_json, UpstreamError, GEO_JSON};
use crate::types::forecast::{ForecastPeriod, ForecastResponse};
use crate::types::observation::{Observation, ObservationResponse};
use crate::types::station::{PointMetadata, StationCollection};
use log::info;
use reqwest::header::ACCEPT;
use reqwest::Client;

/// Public endpoint of the US National Weather Service API.
pub const DEFAULT_NWS_BASE_URL: &str = "https://api.weather.gov";

/// Thin typed wrapper over the weather-service endpoints this crate uses.
/// Each method is exactly one GET.
#[derive(Debug, Clone)]
pub struct NwsClient {
    client: Client,
    base_url: String,
}

impl NwsClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The service accepts at most four decimal places per coordinate.
    pub fn points_url(&self, latitude: f64, longitude: f64) -> String {
        format!("{}/points/{:.4},{:.4}", self.base_url, latitude, longitude)
    }

    pub fn latest_observation_url(&self, station_id: &str) -> String {
        format!(
            "{}/stations/{}/observations/latest",
            self.base_url,
            station_id.trim().to_uppercase()
        )
    }

    pub async fn point_metadata(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<PointMetadata, UpstreamError> {
        let url = self.points_url(latitude, longitude);
        self.get(&url).await
    }

    pub async fn station_collection(&self, url: &str) -> Result<StationCollection, UpstreamError> {
        self.get(url).await
    }

    pub async fn latest_observation(&self, station_id: &str) -> Result<Observation, UpstreamError> {
        let url = self.latest_observation_url(station_id);
        let response: ObservationResponse = self.get(&url).await?;
        Ok(response.properties)
    }

    pub async fn forecast_periods(&self, url: &str) -> Result<Vec<ForecastPeriod>, UpstreamError> {
        let response: ForecastResponse = self.get(url).await?;
        Ok(response.properties.periods)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        info!("Fetching {}", url);
        send_json(url, self.client.get(url).header(ACCEPT, GEO_JSON)).await
    }
}
