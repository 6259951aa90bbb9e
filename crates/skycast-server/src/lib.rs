//! HTTP surface of Skycast
//!
//! `GET /api/geocode` proxies location searches to Nominatim,
//! `GET /api/weather` serves Open-Meteo forecasts, `GET /api/health` reports liveness.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use routes::routes;

use skycast_core::{AppError, Config, NetworkError};
use skycast_weather::{ForecastClient, GeocodeClient};

/// Upstream clients shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub geocoder: GeocodeClient,
    pub forecaster: ForecastClient,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let geocoder = GeocodeClient::new(&config.geocode)
            .map_err(|e| anyhow::anyhow!("Failed to build geocoding client: {}", e))?;
        let forecaster = ForecastClient::new(&config.weather)
            .map_err(|e| anyhow::anyhow!("Failed to build forecast client: {}", e))?;

        Ok(Self {
            geocoder,
            forecaster,
        })
    }
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<(), AppError> {
    let addr = config.server.socket_addr()?;
    let state = AppState::from_config(config)?;

    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .map_err(|e| NetworkError::BindFailed {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;

    tracing::info!("Listening on http://{}", bound);
    server.await;
    tracing::info!("Server shut down");

    Ok(())
}
