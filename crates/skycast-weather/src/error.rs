//! Upstream client error types.

use thiserror::Error;

/// Errors from the Nominatim search client.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// Upstream answered with a non-2xx status.
    #[error("Nominatim API error: {status_text}")]
    Upstream { status: u16, status_text: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors from the Open-Meteo forecast client.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Open-Meteo API error: {status_text}")]
    Upstream { status: u16, status_text: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Reason phrase for a status code, the way browsers report `statusText`.
pub(crate) fn status_text(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_embeds_status_text() {
        let err = GeocodeError::Upstream {
            status: 503,
            status_text: status_text(reqwest::StatusCode::SERVICE_UNAVAILABLE),
        };
        assert_eq!(err.to_string(), "Nominatim API error: Service Unavailable");
    }

    #[test]
    fn test_unregistered_status_text() {
        let status = reqwest::StatusCode::from_u16(599).unwrap();
        assert_eq!(status_text(status), "Unknown");
    }
}
