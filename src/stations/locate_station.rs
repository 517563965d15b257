use crate::stations::distance::haversine_km;
use crate::stations::error::LocateStationError;
use crate::types::station::StationCandidate;
use crate::weather_data::nws_client::NwsClient;
use log::{debug, info};
use ordered_float::OrderedFloat;

/// Resolves a coordinate to the closest observation station the weather
/// service lists for it.
#[derive(Debug, Clone)]
pub struct StationLocator {
    nws: NwsClient,
}

impl StationLocator {
    pub fn new(nws: NwsClient) -> Self {
        Self { nws }
    }

    /// Fetches the candidate stations serving a point, in upstream order.
    /// Features without an identifier or a full coordinate pair are dropped.
    pub async fn fetch_candidates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<StationCandidate>, LocateStationError> {
        let points = self.nws.point_metadata(latitude, longitude).await?;
        let Some(stations_url) = points.properties.observation_stations else {
            debug!(
                "Point ({}, {}) has no observation stations link",
                latitude, longitude
            );
            return Err(LocateStationError::EmptyCandidates {
                lat: latitude,
                lon: longitude,
            });
        };

        let collection = self.nws.station_collection(&stations_url).await?;
        let candidates = collection.candidates();
        debug!(
            "{} of {} station features near ({}, {}) are usable",
            candidates.len(),
            collection.features.len(),
            latitude,
            longitude
        );
        Ok(candidates)
    }

    /// Identifier (uppercased) of the station closest to the given point.
    ///
    /// # Errors
    ///
    /// [`LocateStationError::EmptyCandidates`] when the service lists no usable
    /// station; [`LocateStationError::Upstream`] when a request fails.
    pub async fn find_nearest(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, LocateStationError> {
        let candidates = self.fetch_candidates(latitude, longitude).await?;
        let (station, distance_km) = nearest_station(latitude, longitude, &candidates).ok_or(
            LocateStationError::EmptyCandidates {
                lat: latitude,
                lon: longitude,
            },
        )?;
        info!(
            "Nearest station to ({}, {}) is {} at {:.1} km",
            latitude, longitude, station.station_id, distance_km
        );
        Ok(station.station_id.to_uppercase())
    }
}

/// Picks the candidate with the smallest great-circle distance to the point,
/// returning it with that distance in kilometers.
///
/// Candidates with a blank identifier or non-finite coordinates are skipped.
/// On equal distances the earliest candidate wins. Returns `None` when nothing
/// usable remains.
pub fn nearest_station(
    latitude: f64,
    longitude: f64,
    candidates: &[StationCandidate],
) -> Option<(&StationCandidate, f64)> {
    candidates
        .iter()
        .filter(|c| {
            !c.station_id.trim().is_empty() && c.latitude.is_finite() && c.longitude.is_finite()
        })
        .map(|c| {
            let d = haversine_km(latitude, longitude, c.latitude, c.longitude);
            (c, d)
        })
        // `min_by_key` keeps the first of several equal minima.
        .min_by_key(|(_, d)| OrderedFloat(*d))
}
