// 🌐 HTTP API - bank locator endpoint
//
// GET /fetchBanks?location=<text>[&lat=..&lon=..]
//   200 { "banks": [...] }
//   400 / 404 / 500 { "error": "..." }

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::LocatorError;
use crate::locator::{BankLocator, BankRecord, GeoPoint};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub locator: BankLocator,
}

#[derive(Debug, Deserialize)]
pub struct FetchBanksParams {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[derive(Serialize)]
struct BanksResponse {
    banks: Vec<BankRecord>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for LocatorError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LocatorError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            LocatorError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            LocatorError::Upstream(detail) => {
                error!(detail = %detail, "error fetching banks");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch data from place search".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}

/// GET /fetchBanks - Microfinance banks near a location
async fn fetch_banks(
    State(state): State<AppState>,
    Query(params): Query<FetchBanksParams>,
) -> Result<Json<BanksResponse>, LocatorError> {
    let location = params.location.unwrap_or_default();
    let origin = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };

    let banks = state.locator.lookup(&location, origin).await?;
    Ok(Json(BanksResponse { banks }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(state: AppState, frontend_origin: &str) -> Result<Router> {
    let origin: HeaderValue = frontend_origin
        .parse()
        .with_context(|| format!("Invalid frontend origin: {}", frontend_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/fetchBanks", get(fetch_banks))
        .route("/api/fetchBanks", get(fetch_banks))
        .route("/api/health", get(health_check))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{PlaceSearch, SearchPayload, SerpApiClient};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct StaticSearch(serde_json::Value);

    #[async_trait]
    impl PlaceSearch for StaticSearch {
        async fn search(&self, _text: &str) -> Result<SearchPayload, LocatorError> {
            serde_json::from_value(self.0.clone())
                .map_err(|e| LocatorError::Upstream(e.to_string()))
        }
    }

    struct DownSearch;

    #[async_trait]
    impl PlaceSearch for DownSearch {
        async fn search(&self, _text: &str) -> Result<SearchPayload, LocatorError> {
            Err(LocatorError::Upstream("dns failure".into()))
        }
    }

    fn app(search: Arc<dyn PlaceSearch>) -> Router {
        let state = AppState {
            locator: BankLocator::new(search),
        };
        router(state, "http://localhost:5173").unwrap()
    }

    fn sample_payload() -> serde_json::Value {
        serde_json::json!({
            "local_results": [{
                "title": "Sahyog Microfinance",
                "address": "Dadar, Mumbai",
                "rating": 4.1,
                "gps_coordinates": { "latitude": 19.0178, "longitude": 72.8478 }
            }]
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_banks_ok() {
        let (status, body) = get_json(
            app(Arc::new(StaticSearch(sample_payload()))),
            "/fetchBanks?location=Mumbai",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["banks"][0]["name"], "Sahyog Microfinance");
        assert_eq!(body["banks"][0]["rating"], 4.1);
        assert_eq!(body["banks"][0]["latitude"], 19.0178);
        assert!(body["banks"][0].get("distance_km").is_none());
    }

    #[tokio::test]
    async fn test_fetch_banks_with_origin() {
        let (status, body) = get_json(
            app(Arc::new(StaticSearch(sample_payload()))),
            "/api/fetchBanks?location=Mumbai&lat=19.0&lon=72.85",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["banks"][0]["distance_km"].as_f64().unwrap() < 5.0);
    }

    #[tokio::test]
    async fn test_missing_location_is_bad_request() {
        let (status, body) = get_json(app(Arc::new(DownSearch)), "/fetchBanks").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Location is required");

        let (status, _) = get_json(app(Arc::new(DownSearch)), "/fetchBanks?location=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_no_results_is_not_found() {
        let (status, body) = get_json(
            app(Arc::new(StaticSearch(serde_json::json!({ "search_metadata": {} })))),
            "/fetchBanks?location=Atlantis",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No results found");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_server_error() {
        let (status, body) = get_json(app(Arc::new(DownSearch)), "/fetchBanks?location=Pune").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch data from place search");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(app(Arc::new(DownSearch)), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
    }

    #[test]
    fn test_bad_origin_rejected() {
        let state = AppState {
            locator: BankLocator::new(Arc::new(DownSearch)),
        };
        assert!(router(state, "bad\norigin").is_err());
    }

    // ------------------------------------------------------------------------
    // SerpApiClient against a local stand-in for the search API
    // ------------------------------------------------------------------------

    async fn spawn_upstream(upstream: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_serp_client_sends_query() {
        async fn search(
            Query(params): Query<std::collections::HashMap<String, String>>,
        ) -> Json<serde_json::Value> {
            assert_eq!(params.get("engine").map(String::as_str), Some("google_maps"));
            assert_eq!(params.get("hl").map(String::as_str), Some("en"));
            assert_eq!(params.get("api_key").map(String::as_str), Some("test-key"));
            Json(serde_json::json!({
                "local_results": [{
                    "title": params.get("q").cloned().unwrap_or_default(),
                    "gps_coordinates": { "latitude": 1.0, "longitude": 2.0 }
                }]
            }))
        }

        let base = spawn_upstream(Router::new().route("/search.json", get(search))).await;
        let client = SerpApiClient::new(&base, "test-key", Duration::from_secs(5)).unwrap();
        let locator = BankLocator::new(Arc::new(client));

        let banks = locator.lookup("New Delhi", None).await.unwrap();
        assert_eq!(banks[0].name, "microfinance banks in New Delhi");
        assert_eq!(banks[0].rating.to_string(), "N/A");
    }

    #[tokio::test]
    async fn test_serp_client_non_2xx_is_upstream_error() {
        async fn failing() -> StatusCode {
            StatusCode::SERVICE_UNAVAILABLE
        }

        let base = spawn_upstream(Router::new().route("/search.json", get(failing))).await;
        let client = SerpApiClient::new(&base, "k", Duration::from_secs(5)).unwrap();

        let err = client.search("microfinance banks in Goa").await.unwrap_err();
        assert!(matches!(err, LocatorError::Upstream(ref msg) if msg.contains("503")));
    }
}
