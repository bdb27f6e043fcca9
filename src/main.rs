use pixelforge::{logger, server, Config, ImageClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init()?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    if config.generator.api_key.is_none() {
        log::warn!("⚠️  IMAGE_API_KEY is not set, requests will be sent without credentials");
    }

    let client = match ImageClient::new(config.generator.clone()) {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Failed to initialize image client: {}", e);
            return Err(e.into());
        }
    };

    log::info!("🖼️  Known image generation models:");
    for model in ImageClient::supported_models() {
        log::info!("  {} - {} ({})", model.id, model.name, model.provider);
    }

    server::run(&config, Arc::new(client)).await?;
    Ok(())
}
