//! Cache-wrapped access to observations and forecasts.

use crate::cache::{forecast_key, observation_key, round_coord, TtlCache};
use crate::types::forecast::ForecastPeriod;
use crate::types::location::LatLon;
use crate::types::observation::Observation;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::nws_client::NwsClient;
use bon::bon;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Observations refresh upstream every few minutes.
pub const DEFAULT_OBSERVATION_TTL: Duration = Duration::from_secs(300);
/// Forecasts change less often.
pub const DEFAULT_FORECAST_TTL: Duration = Duration::from_secs(900);

/// Payloads held by the shared weather cache, untransformed.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPayload {
    Observation(Observation),
    Forecast(Vec<ForecastPeriod>),
}

/// The cache shared by every weather fetch in the process.
pub type WeatherCache = TtlCache<WeatherPayload>;

pub struct WeatherFetcher {
    nws: NwsClient,
    cache: Arc<WeatherCache>,
    observation_ttl: Duration,
    forecast_ttl: Duration,
}

#[bon]
impl WeatherFetcher {
    pub fn new(nws: NwsClient, cache: Arc<WeatherCache>) -> Self {
        Self {
            nws,
            cache,
            observation_ttl: DEFAULT_OBSERVATION_TTL,
            forecast_ttl: DEFAULT_FORECAST_TTL,
        }
    }

    /// Overrides the default TTLs used when a call does not pass its own.
    pub fn with_ttls(mut self, observation_ttl: Duration, forecast_ttl: Duration) -> Self {
        self.observation_ttl = observation_ttl;
        self.forecast_ttl = forecast_ttl;
        self
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }

    /// Latest observation for a station, served from cache for `ttl`
    /// (default 300 s) after a successful fetch.
    ///
    /// ```no_run
    /// # use wxbot::{NwsClient, WeatherCache, WeatherFetcher};
    /// # use std::sync::Arc;
    /// # async fn run(nws: NwsClient) -> Result<(), wxbot::WeatherDataError> {
    /// let fetcher = WeatherFetcher::new(nws, Arc::new(WeatherCache::new()));
    /// let obs = fetcher.latest_observation().station("KMWL").call().await?;
    /// println!("{:?}", obs.text_description);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn latest_observation(
        &self,
        station: &str,
        ttl: Option<Duration>,
    ) -> Result<Observation, WeatherDataError> {
        let key = observation_key(station);
        if let Some(WeatherPayload::Observation(obs)) = self.cache.get(&key) {
            debug!("[cache] hit {}", key);
            return Ok(obs);
        }
        info!("[cache] miss {} -> fetching", key);

        let obs = self.nws.latest_observation(station).await?;
        self.cache.set(
            key,
            WeatherPayload::Observation(obs.clone()),
            ttl.unwrap_or(self.observation_ttl),
        );
        Ok(obs)
    }

    /// Forecast periods for a point, served from cache for `ttl` (default
    /// 900 s). Coordinates are rounded to 3 decimals both for the cache key and
    /// for the upstream lookup.
    #[builder]
    pub async fn forecast_periods(
        &self,
        location: LatLon,
        ttl: Option<Duration>,
    ) -> Result<Vec<ForecastPeriod>, WeatherDataError> {
        let key = forecast_key(location.0, location.1);
        if let Some(WeatherPayload::Forecast(periods)) = self.cache.get(&key) {
            debug!("[cache] hit {}", key);
            return Ok(periods);
        }
        info!("[cache] miss {} -> fetching", key);

        let lat = round_coord(location.0);
        let lon = round_coord(location.1);
        let points = self.nws.point_metadata(lat, lon).await?;
        let forecast_url = points
            .properties
            .forecast
            .ok_or(WeatherDataError::MissingForecastUrl { lat, lon })?;
        let periods = self.nws.forecast_periods(&forecast_url).await?;

        self.cache.set(
            key,
            WeatherPayload::Forecast(periods.clone()),
            ttl.unwrap_or(self.forecast_ttl),
        );
        Ok(periods)
    }
}
