//! The bot facade: everything a chat command needs, wired together once at
//! startup.

use crate::config::Config;
use crate::error::WxBotError;
use crate::format::message::{
    forecast_message, observation_message, Message, DEFAULT_FORECAST_LIMIT,
};
use crate::geocode::{GeocodedPlace, Geocoder};
use crate::http::build_client;
use crate::stations::locate_station::StationLocator;
use crate::storage::error::StoreError;
use crate::storage::{JsonFileStore, LocationStore, HOME};
use crate::types::location::{LatLon, LocationEntry, Units};
use crate::utils::ensure_data_dir_exists;
use crate::weather_data::fetcher::{WeatherCache, WeatherFetcher};
use crate::weather_data::nws_client::NwsClient;
use bon::bon;
use log::info;
use std::sync::Arc;

/// Where a user's weather comes from: their saved home, or the configured
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub station_id: String,
    pub lat: f64,
    pub lon: f64,
    pub units: Units,
}

/// Weather answers for chat users.
///
/// Holds one HTTP client, one [`WeatherCache`] and one [`LocationStore`] for
/// the life of the process. Construct it with [`WxBot::connect`] (or
/// [`WxBot::new`] to read the environment) and share it across tasks by
/// reference or `Arc`.
///
/// # Examples
///
/// ```no_run
/// # use wxbot::{Config, WxBot, WxBotError};
/// # async fn run() -> Result<(), WxBotError> {
/// let bot = WxBot::connect().config(Config::default()).call().await?;
/// let now = bot.current_conditions("1234").await?;
/// println!("{now}");
/// # Ok(())
/// # }
/// ```
pub struct WxBot {
    config: Config,
    fetcher: WeatherFetcher,
    station_locator: StationLocator,
    geocoder: Geocoder,
    store: Arc<dyn LocationStore>,
}

#[bon]
impl WxBot {
    /// Wires up a bot from `config`.
    ///
    /// # Arguments
    ///
    /// * `store` - Where saved locations live. Defaults to a [`JsonFileStore`]
    ///   in `config.data_dir`, which is created if missing.
    /// * `cache` - The weather cache to use. Defaults to a fresh one; pass a
    ///   shared handle to let several bots reuse fetched data.
    ///
    /// # Errors
    ///
    /// [`WxBotError::Store`] if the data directory cannot be created, and
    /// [`WxBotError::Upstream`] if the HTTP client cannot be built.
    #[builder]
    pub async fn connect(
        config: Config,
        store: Option<Arc<dyn LocationStore>>,
        cache: Option<Arc<WeatherCache>>,
    ) -> Result<Self, WxBotError> {
        let store: Arc<dyn LocationStore> = match store {
            Some(store) => store,
            None => {
                ensure_data_dir_exists(&config.data_dir).await?;
                Arc::new(JsonFileStore::in_dir(&config.data_dir))
            }
        };
        let cache = cache.unwrap_or_default();

        let client = build_client(&config.user_agent)?;
        let nws = NwsClient::new(client.clone(), &config.nws_base_url);
        let fetcher = WeatherFetcher::new(nws.clone(), cache)
            .with_ttls(config.observation_ttl, config.forecast_ttl);
        let geocoder = Geocoder::new(client, &config.nominatim_base_url, &config.user_agent);

        Ok(Self {
            station_locator: StationLocator::new(nws),
            fetcher,
            geocoder,
            store,
            config,
        })
    }

    /// Reads [`Config::from_env`] and connects with the default store.
    pub async fn new() -> Result<Self, WxBotError> {
        let config = Config::from_env()?;
        Self::connect().config(config).call().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        self.fetcher.cache()
    }

    /// The user's saved `home`, or the configured defaults with imperial units.
    pub async fn resolve_user_location(
        &self,
        user_id: &str,
    ) -> Result<ResolvedLocation, WxBotError> {
        let user = user_id.to_string();
        let saved = self.on_store(move |store| store.get(&user, HOME)).await?;
        let resolved = match saved {
            Some(entry) => ResolvedLocation {
                station_id: self.station_or_default(Some(entry.station_id.as_str())),
                lat: entry.lat,
                lon: entry.lon,
                units: entry.units,
            },
            None => ResolvedLocation {
                station_id: self.station_or_default(None),
                lat: self.config.default_lat,
                lon: self.config.default_lon,
                units: Units::Imperial,
            },
        };
        Ok(resolved)
    }

    /// Current conditions at the user's station.
    pub async fn current_conditions(&self, user_id: &str) -> Result<Message, WxBotError> {
        let location = self.resolve_user_location(user_id).await?;
        let observation = self
            .fetcher
            .latest_observation()
            .station(&location.station_id)
            .call()
            .await?;
        Ok(observation_message(
            &observation,
            &location.station_id,
            location.units,
            self.config.timezone,
        ))
    }

    /// The next `limit` (default 6) forecast periods at the user's location.
    #[builder]
    pub async fn forecast(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Message, WxBotError> {
        let location = self.resolve_user_location(user_id).await?;
        let periods = self
            .fetcher
            .forecast_periods()
            .location(LatLon(location.lat, location.lon))
            .call()
            .await?;
        Ok(forecast_message(
            &periods,
            limit.unwrap_or(DEFAULT_FORECAST_LIMIT),
        ))
    }

    /// Saves `home` from explicit values. Any part left out comes from the
    /// configured defaults.
    ///
    /// # Errors
    ///
    /// [`WxBotError::InvalidCoordinate`] when `lat` or `lon` is not finite or
    /// out of range. Nothing is saved then.
    #[builder]
    pub async fn save_home(
        &self,
        user_id: &str,
        station: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
        #[builder(default)] units: Units,
    ) -> Result<LocationEntry, WxBotError> {
        let LatLon(lat, lon) = LatLon(
            lat.unwrap_or(self.config.default_lat),
            lon.unwrap_or(self.config.default_lon),
        )
        .validate()?;
        let entry = LocationEntry::new(&self.station_or_default(station), lat, lon, units);
        self.save_entry(user_id, entry.clone()).await?;
        info!(
            "Saved home for user {}: station {}",
            user_id, entry.station_id
        );
        Ok(entry)
    }

    /// Geocodes `place` and sets the user's home to the nearest station.
    ///
    /// # Errors
    ///
    /// [`WxBotError::PlaceNotFound`] when the geocoder has no match, and
    /// [`LocateStationError::EmptyCandidates`](crate::LocateStationError::EmptyCandidates)
    /// (wrapped) when no usable station serves the point.
    #[builder]
    pub async fn set_home_by_place(
        &self,
        user_id: &str,
        place: &str,
        #[builder(default)] units: Units,
    ) -> Result<(GeocodedPlace, LocationEntry), WxBotError> {
        let found = self.geocode_place(place).await?;
        let entry = self.set_home_at(user_id, &found, units).await?;
        Ok((found, entry))
    }

    /// First geocoder match for `place`.
    pub async fn geocode_place(&self, place: &str) -> Result<GeocodedPlace, WxBotError> {
        self.geocoder
            .geocode(place)
            .await?
            .ok_or_else(|| WxBotError::PlaceNotFound(place.to_string()))
    }

    /// Finds the station nearest to an already geocoded place and saves it,
    /// with the place's exact coordinates, as the user's home.
    pub async fn set_home_at(
        &self,
        user_id: &str,
        place: &GeocodedPlace,
        units: Units,
    ) -> Result<LocationEntry, WxBotError> {
        let LatLon(lat, lon) = LatLon(place.lat, place.lon).validate()?;
        let station = self.station_locator.find_nearest(lat, lon).await?;
        let entry = LocationEntry::new(&station, lat, lon, units);
        self.save_entry(user_id, entry.clone()).await?;
        info!(
            "Home for user {} set to {} (station {})",
            user_id, place.display_name, entry.station_id
        );
        Ok(entry)
    }

    pub async fn list_locations(&self, user_id: &str) -> Result<Vec<String>, WxBotError> {
        let user = user_id.to_string();
        self.on_store(move |store| store.list(&user)).await
    }

    pub async fn delete_location(&self, user_id: &str, name: &str) -> Result<bool, WxBotError> {
        let (user, name) = (user_id.to_string(), name.to_string());
        self.on_store(move |store| store.delete(&user, &name)).await
    }

    async fn save_entry(&self, user_id: &str, entry: LocationEntry) -> Result<(), WxBotError> {
        let user = user_id.to_string();
        self.on_store(move |store| store.save(&user, HOME, entry)).await
    }

    /// Runs a store call on the blocking pool; stores may do file I/O.
    async fn on_store<T, F>(&self, op: F) -> Result<T, WxBotError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LocationStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        Ok(tokio::task::spawn_blocking(move || op(store.as_ref())).await??)
    }

    fn station_or_default(&self, station: Option<&str>) -> String {
        station
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.config.default_station)
            .to_uppercase()
    }
}
