//! Weather data for Skycast
//!
//! Location search via Nominatim (OpenStreetMap) and forecasts via the
//! Open-Meteo API, plus the data shapes both are exposed through.

pub mod error;
pub mod forecast;
pub mod geocode;
pub mod types;

pub use error::{GeocodeError, WeatherError};
pub use forecast::ForecastClient;
pub use geocode::GeocodeClient;
pub use types::*;
