//! Open-Meteo forecast client.
//!
//! Open-Meteo returns hourly and daily data column-wise (one array per
//! variable); this module zips the columns back into rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use skycast_core::{TemperatureUnit, WeatherConfig};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{status_text, WeatherError};
use crate::types::{Coordinates, CurrentWeather, DailyWeather, HourlyWeather, WeatherDataResponse};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_probability_max";

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current: Option<OmCurrent>,
    hourly: Option<OmHourly>,
    daily: Option<OmDaily>,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    precipitation: f64,
    weather_code: i32,
    wind_speed_10m: f64,
}

// Open-Meteo uses `null` for hours/days it has no value for.
#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    weather_code: Vec<Option<i32>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Arc<Client>,
    base_url: String,
    unit: TemperatureUnit,
    forecast_days: u8,
}

impl ForecastClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            unit: config.temperature_unit,
            forecast_days: config.forecast_days,
        })
    }

    /// Fetch current conditions plus hourly and daily forecasts.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, coords: Coordinates) -> Result<WeatherDataResponse, WeatherError> {
        let url = format!("{}/forecast", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coords.latitude().to_string()),
                ("longitude", coords.longitude().to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "GMT".to_string()),
                ("forecast_days", self.forecast_days.to_string()),
                ("temperature_unit", self.unit.as_str().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Open-Meteo returned status {}", status);
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                status_text: status_text(status),
            });
        }

        let body = response.bytes().await?;
        let raw: OpenMeteoResponse = serde_json::from_slice(&body)
            .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))?;

        into_response(raw)
    }
}

fn into_response(raw: OpenMeteoResponse) -> Result<WeatherDataResponse, WeatherError> {
    let current = raw.current.map(|c| CurrentWeather {
        temperature: c.temperature_2m,
        humidity: c.relative_humidity_2m,
        feels_like: c.apparent_temperature,
        precipitation: c.precipitation,
        weather_code: c.weather_code,
        wind_speed: c.wind_speed_10m,
    });

    let hourly = match raw.hourly {
        Some(h) => hourly_rows(h)?,
        None => Vec::new(),
    };

    let daily = match raw.daily {
        Some(d) => daily_rows(d)?,
        None => Vec::new(),
    };

    Ok(WeatherDataResponse {
        current,
        hourly,
        daily,
    })
}

fn hourly_rows(h: OmHourly) -> Result<Vec<HourlyWeather>, WeatherError> {
    h.time
        .iter()
        .zip(h.temperature_2m)
        .zip(h.precipitation_probability)
        .zip(h.weather_code)
        .map(|(((time, temperature), probability), code)| -> Result<_, WeatherError> {
            Ok(HourlyWeather {
                time: parse_hour(time)?,
                temperature: temperature.unwrap_or_default(),
                precipitation_probability: probability.unwrap_or_default(),
                weather_code: code.unwrap_or_default(),
            })
        })
        .collect()
}

fn daily_rows(d: OmDaily) -> Result<Vec<DailyWeather>, WeatherError> {
    d.time
        .iter()
        .zip(d.weather_code)
        .zip(d.temperature_2m_max)
        .zip(d.temperature_2m_min)
        .zip(d.precipitation_sum)
        .zip(d.precipitation_probability_max)
        .map(|(((((time, code), max), min), sum), probability)| -> Result<_, WeatherError> {
            Ok(DailyWeather {
                time: parse_day(time)?,
                weather_code: code.unwrap_or_default(),
                temperature_max: max.unwrap_or_default(),
                temperature_min: min.unwrap_or_default(),
                precipitation_sum: sum.unwrap_or_default(),
                precipitation_probability: probability.unwrap_or_default(),
            })
        })
        .collect()
}

/// Hourly timestamps come back as `2025-07-15T13:00` in the requested (GMT) zone.
fn parse_hour(s: &str) -> Result<DateTime<Utc>, WeatherError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| WeatherError::Parse(format!("Bad hourly time '{}': {}", s, e)))
}

fn parse_day(s: &str) -> Result<DateTime<Utc>, WeatherError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| WeatherError::Parse(format!("Bad daily time '{}': {}", s, e)))
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(json: serde_json::Value) -> Result<WeatherDataResponse, WeatherError> {
        let raw: OpenMeteoResponse = serde_json::from_value(json).unwrap();
        into_response(raw)
    }

    #[test]
    fn test_columns_become_rows() {
        let data = parse(serde_json::json!({
            "hourly": {
                "time": ["2025-07-15T00:00", "2025-07-15T01:00"],
                "temperature_2m": [17.1, 16.4],
                "precipitation_probability": [0, 5],
                "weather_code": [1, 3]
            },
            "daily": {
                "time": ["2025-07-15"],
                "weather_code": [61],
                "temperature_2m_max": [25.3],
                "temperature_2m_min": [14.9],
                "precipitation_sum": [1.2],
                "precipitation_probability_max": [70]
            }
        }))
        .unwrap();

        assert!(data.current.is_none());
        assert_eq!(data.hourly.len(), 2);
        assert_eq!(
            data.hourly[1].time,
            Utc.with_ymd_and_hms(2025, 7, 15, 1, 0, 0).unwrap()
        );
        assert_eq!(data.hourly[1].precipitation_probability, 5.0);
        assert_eq!(data.hourly[1].weather_code, 3);

        assert_eq!(data.daily.len(), 1);
        assert_eq!(
            data.daily[0].time,
            Utc.with_ymd_and_hms(2025, 7, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(data.daily[0].temperature_max, 25.3);
        assert_eq!(data.daily[0].precipitation_probability, 70.0);
    }

    #[test]
    fn test_uneven_columns_truncate_to_shortest() {
        let data = parse(serde_json::json!({
            "hourly": {
                "time": ["2025-07-15T00:00", "2025-07-15T01:00", "2025-07-15T02:00"],
                "temperature_2m": [17.1, 16.4],
                "precipitation_probability": [0, 5, 10],
                "weather_code": [1, 3, 3]
            }
        }))
        .unwrap();

        assert_eq!(data.hourly.len(), 2);
    }

    #[test]
    fn test_null_values_default_to_zero() {
        let data = parse(serde_json::json!({
            "hourly": {
                "time": ["2025-07-30T23:00"],
                "temperature_2m": [21.0],
                "precipitation_probability": [null],
                "weather_code": [2]
            }
        }))
        .unwrap();

        assert_eq!(data.hourly[0].precipitation_probability, 0.0);
    }

    #[test]
    fn test_current_block_mapped() {
        let data = parse(serde_json::json!({
            "current": {
                "time": "2025-07-15T12:00",
                "interval": 900,
                "temperature_2m": 22.4,
                "relative_humidity_2m": 55,
                "apparent_temperature": 21.8,
                "precipitation": 0.0,
                "weather_code": 2,
                "wind_speed_10m": 11.5
            }
        }))
        .unwrap();

        let current = data.current.unwrap();
        assert_eq!(current.temperature, 22.4);
        assert_eq!(current.humidity, 55.0);
        assert_eq!(current.feels_like, 21.8);
        assert_eq!(current.wind_speed, 11.5);
        assert!(data.hourly.is_empty());
        assert!(data.daily.is_empty());
    }

    #[test]
    fn test_bad_timestamp_is_parse_error() {
        let err = parse(serde_json::json!({
            "hourly": {
                "time": ["yesterday"],
                "temperature_2m": [1.0],
                "precipitation_probability": [0],
                "weather_code": [0]
            }
        }))
        .unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
