use anyhow::Result;
use skycast_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let (config, validation) = Config::load_validated()?;
    tracing::info!(
        "Configuration loaded ({} warnings); geocoding via {}, forecasts via {}",
        validation.warnings.len(),
        config.geocode.base_url,
        config.weather.base_url
    );

    if let Err(e) = skycast_server::serve(&config).await {
        tracing::error!("{}", e.user_message());
        return Err(e.into());
    }

    Ok(())
}
