// 🏦 Bank Locator - place-search proxy for microfinance banks
//
// Flow: Idle → Querying → Success(banks) | Empty | Failed(reason)
//
// The location is validated BEFORE any network call. Upstream results are
// reshaped into flat `BankRecord`s; nothing is stored.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::LocatorError;

/// Prefix of every upstream search
pub const QUERY_PREFIX: &str = "microfinance banks in";

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://serpapi.com";

/// Mean Earth radius used by the haversine distance
const EARTH_RADIUS_KM: f64 = 6371.0;

// ============================================================================
// QUERY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BankQuery {
    location: String,
}

impl BankQuery {
    pub fn new(location: &str) -> Result<Self, LocatorError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LocatorError::InvalidInput("Location is required".to_string()));
        }
        Ok(BankQuery {
            location: location.to_string(),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Full text sent upstream
    pub fn search_text(&self) -> String {
        format!("{} {}", QUERY_PREFIX, self.location)
    }
}

// ============================================================================
// GEO
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint { latitude, longitude }
    }

    /// Great-circle distance in kilometres
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

// ============================================================================
// BANK RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    /// Serialized as "N/A"
    NotAvailable,
}

impl From<Option<f64>> for Rating {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(score) if score.is_finite() => Rating::Score(score),
            _ => Rating::NotAvailable,
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(score) => serializer.serialize_f64(*score),
            Rating::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{}", score),
            Rating::NotAvailable => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankRecord {
    pub name: String,
    pub address: String,
    pub rating: Rating,
    pub latitude: f64,
    pub longitude: f64,

    /// Only set when the caller supplied a position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl BankRecord {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.latitude, self.longitude
        )
    }
}

// ============================================================================
// UPSTREAM PAYLOAD
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub local_results: Option<Vec<PlaceResult>>,

    /// Set by the search API when it refuses the request
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub gps_coordinates: Option<GpsCoordinates>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Flatten upstream results. Places without coordinates can't be mapped and are dropped.
pub fn reshape(payload: SearchPayload) -> Result<Vec<BankRecord>, LocatorError> {
    if let Some(message) = payload.error {
        return Err(LocatorError::Upstream(message));
    }

    let results = payload.local_results.unwrap_or_default();
    let total = results.len();

    let banks: Vec<BankRecord> = results
        .into_iter()
        .filter_map(|place| {
            let gps = place.gps_coordinates?;
            Some(BankRecord {
                name: place.title.unwrap_or_else(|| "Unnamed bank".to_string()),
                address: place.address.unwrap_or_default(),
                rating: Rating::from(place.rating),
                latitude: gps.latitude,
                longitude: gps.longitude,
                distance_km: None,
            })
        })
        .collect();

    if banks.len() < total {
        warn!(dropped = total - banks.len(), "skipped places without coordinates");
    }

    if banks.is_empty() {
        return Err(LocatorError::NotFound);
    }
    Ok(banks)
}

// ============================================================================
// SEARCH SEAM
// ============================================================================

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, text: &str) -> Result<SearchPayload, LocatorError>;
}

/// Place search backed by the SerpAPI maps engine
pub struct SerpApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, LocatorError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(SerpApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl PlaceSearch for SerpApiClient {
    async fn search(&self, text: &str) -> Result<SearchPayload, LocatorError> {
        let url = format!("{}/search.json", self.base_url);
        info!(query = text, "querying place search");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("engine", "google_maps"),
                ("q", text),
                ("hl", "en"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "place search returned an error status");
            return Err(LocatorError::Upstream(format!("upstream status {}", status)));
        }

        Ok(response.json::<SearchPayload>().await?)
    }
}

// ============================================================================
// LOCATOR
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Idle,
    Querying { location: String },
    Success(Vec<BankRecord>),
    Empty,
    Failed(String),
}

impl LookupState {
    /// Terminal state for a finished lookup
    pub fn settle(result: Result<Vec<BankRecord>, LocatorError>) -> Self {
        match result {
            Ok(banks) => LookupState::Success(banks),
            Err(LocatorError::NotFound) => LookupState::Empty,
            Err(err) => LookupState::Failed(err.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LookupState::Success(_) | LookupState::Empty | LookupState::Failed(_)
        )
    }

    /// Idle → Querying → terminal. Idle may also fail straight away
    /// when the query is rejected before reaching the network.
    pub fn can_advance_to(&self, next: &LookupState) -> bool {
        match (self, next) {
            (LookupState::Idle, LookupState::Querying { .. }) => true,
            (LookupState::Idle, LookupState::Failed(_)) => true,
            (LookupState::Querying { .. }, next) => next.is_terminal(),
            _ => false,
        }
    }

    /// Move to `next` if the transition is legal. Returns whether it moved.
    pub fn advance(&mut self, next: LookupState) -> bool {
        if !self.can_advance_to(&next) {
            warn!(from = ?self, to = ?next, "illegal lookup transition ignored");
            return false;
        }
        debug!(from = ?self, to = ?next, "lookup transition");
        *self = next;
        true
    }
}

#[derive(Clone)]
pub struct BankLocator {
    search: Arc<dyn PlaceSearch>,
}

impl BankLocator {
    pub fn new(search: Arc<dyn PlaceSearch>) -> Self {
        BankLocator { search }
    }

    /// Drive one lookup through its states and return the terminal one
    pub async fn run(&self, location: &str, origin: Option<GeoPoint>) -> LookupState {
        let mut state = LookupState::Idle;

        let query = match BankQuery::new(location) {
            Ok(query) => query,
            Err(err) => {
                state.advance(LookupState::settle(Err(err)));
                return state;
            }
        };

        state.advance(LookupState::Querying {
            location: query.location().to_string(),
        });
        let result = self.fetch(&query, origin).await;
        state.advance(LookupState::settle(result));
        state
    }

    /// Search banks near `location`. With an `origin`, results carry a
    /// distance and come back nearest first.
    pub async fn lookup(
        &self,
        location: &str,
        origin: Option<GeoPoint>,
    ) -> Result<Vec<BankRecord>, LocatorError> {
        let query = BankQuery::new(location)?;
        self.fetch(&query, origin).await
    }

    async fn fetch(
        &self,
        query: &BankQuery,
        origin: Option<GeoPoint>,
    ) -> Result<Vec<BankRecord>, LocatorError> {
        let payload = self.search.search(&query.search_text()).await?;
        let mut banks = reshape(payload)?;

        if let Some(origin) = origin {
            for bank in &mut banks {
                bank.distance_km = Some(origin.distance_km(&bank.position()));
            }
            banks.sort_by(|a, b| {
                a.distance_km
                    .partial_cmp(&b.distance_km)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        info!(location = query.location(), count = banks.len(), "banks located");
        Ok(banks)
    }
}

// ============================================================================
// TESTS
// ============================================================================
