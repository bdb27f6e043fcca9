//! HTTP surface for the generation client.
//!
//! `POST /generate` runs one generation and answers with a
//! [`GenerationResponse`](crate::models::GenerationResponse); failures carry the
//! status mapped from the error kind.

pub mod routes;

use crate::{
    client::ImageGenerator, config::Config, error::GenerationError, logger,
    models::GenerationResponse,
};
use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer, ResponseError};
use std::sync::Arc;

pub use routes::configure_routes;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ImageGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }
}

impl ResponseError for GenerationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self))
            .json(GenerationResponse::failure(self.user_message()))
    }
}

/// Malformed bodies are reported in the same shape as any other generation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected malformed generation request: {}", err);
        GenerationError::InvalidInput("Invalid request body".into()).into()
    })
}

pub async fn run(config: &Config, generator: Arc<dyn ImageGenerator>) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(generator));
    let port = config.port_or_default();

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        port,
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .configure(configure_routes)
    })
    .bind((config.host.as_str(), port))?
    .run()
    .await
}
