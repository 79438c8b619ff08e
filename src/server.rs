//! HTTP API server
//!
//! Five JSON endpoints over the city dataset and the route provider, plus a
//! health probe and OpenAPI docs. The dataset handle is injected through
//! axum state; mutation holds its write lock across the file append and the
//! in-memory update (file first) so the two copies cannot diverge.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::dataset::{append_row, City, CityDataset};
use crate::core::error::{Error, Result};
use crate::core::geocode::Geocoder;
use crate::core::router::RouterBackend;

/// Shared application state, constructed once at startup
pub struct AppState {
    pub dataset: RwLock<CityDataset>,
    pub csv_path: PathBuf,
    pub router: RouterBackend,
    pub geocoder: Option<Geocoder>,
}

impl AppState {
    pub fn new(
        dataset: CityDataset,
        csv_path: impl Into<PathBuf>,
        router: RouterBackend,
        geocoder: Option<Geocoder>,
    ) -> Self {
        Self {
            dataset: RwLock::new(dataset),
            csv_path: csv_path.into(),
            router,
            geocoder,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, get_cities, get_coordinates, get_route, add_city),
    components(schemas(
        CoordinatesRequest,
        CoordinatesResponse,
        RouteRequest,
        RouteResponse,
        AddCityRequest,
        MessageResponse,
        HealthResponse,
        ErrorResponse
    )),
    info(
        title = "Rahyab API",
        description = "Iranian city lookup and driving-route service"
    )
)]
struct ApiDoc;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CitiesQuery {
    /// Case-insensitive substring to match against city names
    query: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CoordinatesRequest {
    /// Exact city name
    #[schema(example = "Tehran")]
    pub city: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoordinatesResponse {
    #[schema(example = 35.6892)]
    pub lat: f64,
    #[schema(example = 51.389)]
    pub lon: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RouteRequest {
    /// Origin city name
    #[schema(example = "Tehran")]
    pub place1: String,
    /// Destination city name
    #[schema(example = "Shiraz")]
    pub place2: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResponse {
    /// Route path as reported by the provider
    pub coordinates: Vec<[f64; 2]>,
    /// Kilometers, rounded to 2 decimals
    #[schema(example = 919.46)]
    pub distance: f64,
    /// Hours, rounded to 2 decimals
    #[schema(example = 9.6)]
    pub duration: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCityRequest {
    pub city: Option<String>,
    pub lat: Option<f64>,
    /// Longitude; `lon` is accepted as an alias
    #[serde(alias = "lon")]
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Number of cities currently loaded
    pub cities: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error wrapper mapping the library taxonomy onto HTTP statuses
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::CityNotFound { .. } | Error::RouteNotFound => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Timeout(_)
            | Error::Provider(_)
            | Error::Dataset(_)
            | Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

/// Resolve a city name to coordinates: dataset first, then the optional
/// geocoder fallback
async fn resolve_city(state: &AppState, name: &str) -> Result<(f64, f64)> {
    if let Some(coords) = state.dataset.read().coordinates(name) {
        return Ok(coords);
    }

    if let Some(geocoder) = &state.geocoder {
        if let Some(coords) = geocoder.resolve(name).await? {
            return Ok(coords);
        }
    }

    let suggestion = state.dataset.read().suggest(name);
    Err(Error::CityNotFound {
        name: name.to_string(),
        suggestion,
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "service"
)]
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        cities: state.dataset.read().len(),
    })
}

#[utoipa::path(
    get,
    path = "/get_cities",
    params(CitiesQuery),
    responses((status = 200, description = "At most 10 matching city names", body = [String])),
    tag = "cities"
)]
async fn get_cities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CitiesQuery>,
) -> Json<Vec<String>> {
    let query = params.query.unwrap_or_default();
    Json(state.dataset.read().search(&query))
}

#[utoipa::path(
    post,
    path = "/get_coordinates",
    request_body = CoordinatesRequest,
    responses(
        (status = 200, description = "Coordinates found", body = CoordinatesResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 500, description = "Geocoding failure", body = ErrorResponse)
    ),
    tag = "cities"
)]
async fn get_coordinates(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CoordinatesRequest>,
) -> std::result::Result<Json<CoordinatesResponse>, ApiError> {
    let (lat, lon) = resolve_city(&state, &req.city).await?;
    Ok(Json(CoordinatesResponse { lat, lon }))
}

#[utoipa::path(
    post,
    path = "/get_route",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Driving route between the two cities", body = RouteResponse),
        (status = 404, description = "City or route not found", body = ErrorResponse),
        (status = 500, description = "Routing provider failure or timeout", body = ErrorResponse)
    ),
    tag = "routing"
)]
async fn get_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RouteRequest>,
) -> std::result::Result<Json<RouteResponse>, ApiError> {
    // Both endpoints must resolve before the provider is contacted
    let from = resolve_city(&state, &req.place1).await?;
    let to = resolve_city(&state, &req.place2).await?;

    let summary = state.router.route(from, to).await?;
    Ok(Json(RouteResponse {
        coordinates: summary.coordinates,
        distance: summary.distance,
        duration: summary.duration,
    }))
}

#[utoipa::path(
    post,
    path = "/add_city",
    request_body = AddCityRequest,
    responses(
        (status = 200, description = "City appended to the dataset", body = MessageResponse),
        (status = 400, description = "Missing or empty fields", body = ErrorResponse),
        (status = 500, description = "Backing file could not be written", body = ErrorResponse)
    ),
    tag = "cities"
)]
async fn add_city(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCityRequest>,
) -> std::result::Result<Json<MessageResponse>, ApiError> {
    let name = req.city.as_deref().unwrap_or("").trim().to_string();
    // A coordinate of exactly 0.0 is treated as absent, same as the falsy
    // check in the original form handling
    let lat = req.lat.filter(|v| *v != 0.0);
    let lng = req.lng.filter(|v| *v != 0.0);

    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(Error::BadRequest(
            "City name, latitude, and longitude are required".to_string(),
        )
        .into());
    };
    if name.is_empty() {
        return Err(Error::BadRequest(
            "City name, latitude, and longitude are required".to_string(),
        )
        .into());
    }

    let city = City::new(name.clone(), lat, lng);

    // File first, then memory, under one write lock
    {
        let mut dataset = state.dataset.write();
        append_row(&state.csv_path, &city)?;
        dataset.add(city);
    }

    Ok(Json(MessageResponse {
        message: format!("City '{}' added successfully", name),
    }))
}

/// Build the axum router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .route("/get_cities", get(get_cities))
        .route("/get_coordinates", post(get_coordinates))
        .route("/get_route", post(get_route))
        .route("/add_city", post(add_city))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn run_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    println!("🚀 Server starting on http://{}", addr);
    println!("📚 API docs available at http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
