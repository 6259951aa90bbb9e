use serde::Serialize;
use skycast_core::ReqwestErrorExt;
use skycast_weather::{Coordinates, GeocodeError, WeatherError};
use std::collections::HashMap;
use warp::{Rejection, Reply};

use crate::error::{
    ApiError, COORDINATES_OUT_OF_RANGE, LOCATION_FETCH_FAILED, MISSING_COORDINATES,
    MISSING_QUERY, WEATHER_FETCH_FAILED,
};
use crate::AppState;

type Query = HashMap<String, String>;

/// `GET /api/geocode?q=...`
pub async fn geocode(params: Query, state: AppState) -> Result<impl Reply, Rejection> {
    let query = match params.get("q").map(String::as_str) {
        Some(q) if !q.is_empty() => q,
        _ => return Err(warp::reject::custom(ApiError::MissingParameter(MISSING_QUERY))),
    };

    match state.geocoder.search(query).await {
        Ok(places) => Ok(warp::reply::with_header(places, "content-type", "application/json")),
        Err(err) => Err(warp::reject::custom(geocode_failure(err))),
    }
}

fn geocode_failure(err: GeocodeError) -> ApiError {
    match err {
        GeocodeError::Upstream { status, .. } => ApiError::Upstream {
            status,
            message: err.to_string(),
        },
        GeocodeError::Network(e) => {
            tracing::warn!("Location lookup failed: {}", e.into_network_error());
            ApiError::Unexpected(LOCATION_FETCH_FAILED)
        }
        GeocodeError::Parse(msg) => {
            tracing::warn!("Location lookup returned bad JSON: {}", msg);
            ApiError::Unexpected(LOCATION_FETCH_FAILED)
        }
    }
}

/// `GET /api/weather?latitude=..&longitude=..`
pub async fn weather(params: Query, state: AppState) -> Result<impl Reply, Rejection> {
    let coords = parse_coordinates(&params).map_err(warp::reject::custom)?;

    match state.forecaster.fetch(coords).await {
        Ok(data) => Ok(warp::reply::json(&data)),
        Err(err) => Err(warp::reject::custom(weather_failure(err))),
    }
}

fn parse_coordinates(params: &Query) -> Result<Coordinates, ApiError> {
    let read = |key: &str| params.get(key).and_then(|v| v.trim().parse::<f64>().ok());

    let (latitude, longitude) = match (read("latitude"), read("longitude")) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(ApiError::MissingParameter(MISSING_COORDINATES)),
    };

    Coordinates::new(latitude, longitude)
        .map_err(|_| ApiError::InvalidParameter(COORDINATES_OUT_OF_RANGE))
}

fn weather_failure(err: WeatherError) -> ApiError {
    match err {
        WeatherError::Upstream { status, .. } => ApiError::Upstream {
            status,
            message: err.to_string(),
        },
        WeatherError::InvalidCoordinates { .. } => {
            ApiError::InvalidParameter(COORDINATES_OUT_OF_RANGE)
        }
        WeatherError::Network(e) => {
            tracing::warn!("Forecast fetch failed: {}", e.into_network_error());
            ApiError::Unexpected(WEATHER_FETCH_FAILED)
        }
        WeatherError::Parse(msg) => {
            tracing::warn!("Forecast returned bad data: {}", msg);
            ApiError::Unexpected(WEATHER_FETCH_FAILED)
        }
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// `GET /api/health`
pub fn health() -> impl Reply {
    warp::reply::json(&Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
