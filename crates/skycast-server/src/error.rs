//! HTTP error responses.
//!
//! Handlers reject with [`ApiError`]; [`recover`] turns every rejection,
//! ours or warp's, into a `{ "statusCode": .., "message": .. }` body.

use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

pub const MISSING_QUERY: &str = "Query parameter \"q\" is required";
pub const MISSING_COORDINATES: &str = "Query parameters \"latitude\" and \"longitude\" are required";
pub const COORDINATES_OUT_OF_RANGE: &str = "Coordinates are out of range";
pub const LOCATION_FETCH_FAILED: &str = "Failed to fetch location data";
pub const WEATHER_FETCH_FAILED: &str = "Failed to fetch weather data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A required query parameter is absent (400).
    MissingParameter(&'static str),

    /// A query parameter is present but unusable (400).
    InvalidParameter(&'static str),

    /// Upstream answered non-2xx; its status is passed through.
    Upstream { status: u16, message: String },

    /// Anything else (500). The cause is logged, not returned.
    Unexpected(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) | ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::MissingParameter(msg)
            | ApiError::InvalidParameter(msg)
            | ApiError::Unexpected(msg) => msg,
            ApiError::Upstream { message, .. } => message,
        }
    }
}

impl warp::reject::Reject for ApiError {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    message: &'a str,
}

fn error_reply(status: StatusCode, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    let body = ErrorBody {
        status_code: status.as_u16(),
        message,
    };
    warp::reply::with_status(warp::reply::json(&body), status)
}

pub async fn recover(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(api_err) = err.find::<ApiError>() {
        return Ok(error_reply(api_err.status(), api_err.message()));
    }

    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not found"));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }

    if err.find::<warp::reject::InvalidQuery>().is_some() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Invalid query string"));
    }

    tracing::error!("Unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
    ))
}
