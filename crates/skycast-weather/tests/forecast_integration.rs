//! Integration tests for ForecastClient using wiremock.

use skycast_core::{TemperatureUnit, WeatherConfig};
use skycast_weather::{Coordinates, ForecastClient, WeatherError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, unit: TemperatureUnit) -> ForecastClient {
    let config = WeatherConfig {
        base_url: server.uri(),
        temperature_unit: unit,
        forecast_days: 3,
    };
    ForecastClient::new(&config).unwrap()
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "timezone": "GMT",
        "current": {
            "time": "2025-07-15T12:00",
            "temperature_2m": 24.1,
            "relative_humidity_2m": 48,
            "apparent_temperature": 23.5,
            "precipitation": 0.0,
            "weather_code": 1,
            "wind_speed_10m": 9.7
        },
        "hourly": {
            "time": ["2025-07-15T00:00", "2025-07-15T01:00", "2025-07-15T02:00"],
            "temperature_2m": [17.2, 16.8, 16.1],
            "precipitation_probability": [0, 0, 3],
            "weather_code": [0, 1, 2]
        },
        "daily": {
            "time": ["2025-07-15", "2025-07-16", "2025-07-17"],
            "weather_code": [1, 61, 95],
            "temperature_2m_max": [26.0, 21.4, 23.9],
            "temperature_2m_min": [15.2, 14.0, 13.8],
            "precipitation_sum": [0.0, 4.3, 11.0],
            "precipitation_probability_max": [5, 80, 90]
        }
    })
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.41"))
        .and(query_param("timezone", "GMT"))
        .and(query_param("forecast_days", "3"))
        .and(query_param("temperature_unit", "celsius"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, TemperatureUnit::Celsius);
    let coords = Coordinates::new(52.52, 13.41).unwrap();
    let data = client.fetch(coords).await.unwrap();

    let current = data.current.expect("current block present");
    assert_eq!(current.temperature, 24.1);
    assert_eq!(current.humidity, 48.0);

    assert_eq!(data.hourly.len(), 3);
    assert_eq!(data.hourly[2].weather_code, 2);

    assert_eq!(data.daily.len(), 3);
    assert_eq!(data.daily[1].precipitation_sum, 4.3);
    assert_eq!(data.daily[2].precipitation_probability, 90.0);
}

#[tokio::test]
async fn test_fetch_requests_fahrenheit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, TemperatureUnit::Fahrenheit);
    let coords = Coordinates::new(40.71, -74.0).unwrap();
    assert!(client.fetch(coords).await.is_ok());
}

#[tokio::test]
async fn test_fetch_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Parameter 'forecast_days' is out of allowed range"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, TemperatureUnit::Celsius);
    let coords = Coordinates::new(0.0, 0.0).unwrap();
    let err = client.fetch(coords).await.unwrap_err();

    assert!(matches!(err, WeatherError::Upstream { status: 400, .. }));
    assert_eq!(err.to_string(), "Open-Meteo API error: Bad Request");
}

#[tokio::test]
async fn test_fetch_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"hourly\": "))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, TemperatureUnit::Celsius);
    let coords = Coordinates::new(0.0, 0.0).unwrap();
    let err = client.fetch(coords).await.unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Reserve a port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = WeatherConfig {
        base_url: format!("http://127.0.0.1:{}", port),
        ..WeatherConfig::default()
    };
    let client = ForecastClient::new(&config).unwrap();
    let coords = Coordinates::new(0.0, 0.0).unwrap();
    let err = client.fetch(coords).await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(_)));
}
