use super::AppState;
use crate::{
    error::GenerationError,
    models::{GenerationRequest, GenerationResponse},
};
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/generate")
            .route(web::post().to(generate))
            .route(web::get().to(generate_info)),
    )
    .route("/health", web::get().to(health_check));
}

async fn generate(
    state: web::Data<AppState>,
    body: web::Json<GenerationRequest>,
) -> Result<HttpResponse, GenerationError> {
    let request = body.into_inner();
    let request_id = Uuid::new_v4();

    log::info!(
        "POST /generate {}x{} {} [req:{}]",
        request.settings.width,
        request.settings.height,
        request.settings.style,
        request_id
    );

    match state.generator.generate(&request).await {
        Ok(outcome) => {
            log::info!(
                "Generation succeeded in {}ms [req:{}]",
                outcome.generation_time_ms,
                request_id
            );
            Ok(HttpResponse::Ok().json(GenerationResponse::success(&outcome)))
        }
        Err(e) => {
            log::error!("Image generation error: {} [req:{}]", e, request_id);
            Err(e)
        }
    }
}

async fn generate_info() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Image generation API. Use POST method with prompt and settings."
    }))
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
